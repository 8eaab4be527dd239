//! The crate's own dynamic value model.
//!
//! [`DynamicValue`] mirrors what a scripting runtime hands over: nil,
//! booleans, integers, numbers, strings and tables. [`DynamicRecord`] is the
//! table, keeping keys in insertion order so decoded records enumerate
//! fields in descriptor order.

use std::fmt;

use crate::host::{ScriptTable, ScriptValue, ValueKind};

/// A dynamic script value.
///
/// Equality follows script semantics: an integer equals a number with the
/// same mathematical value, and tables compare by content regardless of key
/// order.
#[derive(Debug, Clone, Default)]
pub enum DynamicValue {
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Table(DynamicRecord),
}

impl DynamicValue {
    /// Borrow the nested table, if this value is one.
    #[must_use]
    pub fn as_record(&self) -> Option<&DynamicRecord> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl PartialEq for DynamicValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Integer(i), Self::Number(n)) | (Self::Number(n), Self::Integer(i)) => {
                n.fract() == 0.0 && *n == *i as f64
            }
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Table(a), Self::Table(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Table(t) => write!(f, "{t}"),
        }
    }
}

impl From<bool> for DynamicValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for DynamicValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for DynamicValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<i64> for DynamicValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f32> for DynamicValue {
    fn from(value: f32) -> Self {
        Self::Number(value.into())
    }
}

impl From<f64> for DynamicValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<DynamicRecord> for DynamicValue {
    fn from(value: DynamicRecord) -> Self {
        Self::Table(value)
    }
}

/// A keyed table with insertion-ordered keys.
#[derive(Debug, Clone, Default)]
pub struct DynamicRecord {
    entries: Vec<(String, DynamicValue)>,
}

impl DynamicRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Set a field. Existing keys keep their position; setting nil removes
    /// the key, as assigning nil to a script table does.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<DynamicValue>) {
        let key = key.into();
        let value = value.into();
        let existing = self.entries.iter().position(|(k, _)| *k == key);
        match (existing, value) {
            (Some(pos), DynamicValue::Nil) => {
                self.entries.remove(pos);
            }
            (Some(pos), value) => self.entries[pos].1 = value,
            (None, DynamicValue::Nil) => {}
            (None, value) => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`Self::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<DynamicValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DynamicValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for DynamicRecord {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}

impl fmt::Display for DynamicRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k} = {v}")?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<DynamicValue>> FromIterator<(K, V)> for DynamicRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}

impl ScriptValue for DynamicValue {
    type Table = DynamicRecord;

    fn kind(&self) -> ValueKind {
        match self {
            Self::Nil => ValueKind::Nil,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Integer(_) => ValueKind::Integer,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Table(_) => ValueKind::Table,
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    fn as_table(&self) -> Option<&DynamicRecord> {
        self.as_record()
    }

    fn from_integer(value: i64) -> Self {
        Self::Integer(value)
    }

    fn from_number(value: f64) -> Self {
        Self::Number(value)
    }

    fn from_string(value: String) -> Self {
        Self::String(value)
    }

    fn from_table(table: DynamicRecord) -> Self {
        Self::Table(table)
    }
}

impl ScriptTable for DynamicRecord {
    type Value = DynamicValue;

    fn new_table() -> Self {
        Self::new()
    }

    fn get(&self, key: &str) -> Option<&DynamicValue> {
        DynamicRecord::get(self, key)
    }

    fn set_field(&mut self, key: &str, value: DynamicValue) {
        self.set(key, value);
    }
}
