//! Host binding for `serde_json` values.
//!
//! Lets tools pack JSON documents directly. Objects are tables; arrays have
//! no packable shape and report [`ValueKind::Other`].

use serde_json::{Map, Number, Value};

use crate::host::{ScriptTable, ScriptValue, ValueKind};

impl ScriptValue for Value {
    type Table = Map<String, Value>;

    fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Nil,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(n) if n.is_i64() => ValueKind::Integer,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Object(_) => ValueKind::Table,
            Value::Array(_) => ValueKind::Other,
        }
    }

    fn as_integer(&self) -> Option<i64> {
        Value::as_i64(self)
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_i64() => n.as_f64(),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        Value::as_str(self)
    }

    fn as_table(&self) -> Option<&Map<String, Value>> {
        self.as_object()
    }

    fn from_integer(value: i64) -> Self {
        Value::Number(value.into())
    }

    fn from_number(value: f64) -> Self {
        // JSON has no NaN or infinities.
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }

    fn from_string(value: String) -> Self {
        Value::String(value)
    }

    fn from_table(table: Map<String, Value>) -> Self {
        Value::Object(table)
    }
}

impl ScriptTable for Map<String, Value> {
    type Value = Value;

    fn new_table() -> Self {
        Map::new()
    }

    fn get(&self, key: &str) -> Option<&Value> {
        Map::get(self, key)
    }

    fn set_field(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(json!(null).kind(), ValueKind::Nil);
        assert_eq!(json!(true).kind(), ValueKind::Boolean);
        assert_eq!(json!(-4).kind(), ValueKind::Integer);
        assert_eq!(json!(4294967295u64).kind(), ValueKind::Integer);
        assert_eq!(json!(1.5).kind(), ValueKind::Number);
        assert_eq!(json!(u64::MAX).kind(), ValueKind::Number);
        assert_eq!(json!("s").kind(), ValueKind::String);
        assert_eq!(json!({}).kind(), ValueKind::Table);
        assert_eq!(json!([1, 2]).kind(), ValueKind::Other);
    }

    #[test]
    fn test_large_unsigned_reads_as_number() {
        let v = json!(u64::MAX);
        assert_eq!(ScriptValue::as_integer(&v), None);
        assert_eq!(ScriptValue::as_number(&v), Some(u64::MAX as f64));
    }

    #[test]
    fn test_nan_becomes_null() {
        assert_eq!(<Value as ScriptValue>::from_number(f64::NAN), Value::Null);
    }

    #[test]
    fn test_table_insertion_order() {
        let mut map = <Map<String, Value> as ScriptTable>::new_table();
        map.set_field("z", json!(1));
        map.set_field("a", json!(2));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["z", "a"]);
    }
}
