//! The narrow capability interface the marshaller needs from a script host.
//!
//! The encoder only ever looks fields up by name and inspects values; the
//! decoder only ever creates tables and sets fields. A host runtime binding
//! implements these two traits for its own value representation and the
//! marshaller never sees anything else of it.

use std::fmt;

/// Runtime type of a script value, as far as packing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Boolean,
    Integer,
    Number,
    String,
    Table,
    /// Anything the marshaller cannot pack (arrays, functions, userdata...).
    Other,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nil => "nil",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Table => "table",
            Self::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// A single host value.
pub trait ScriptValue: Sized {
    /// The host's table type.
    type Table: ScriptTable<Value = Self>;

    /// Type introspection.
    fn kind(&self) -> ValueKind;

    /// The value as an integer, if it is one.
    fn as_integer(&self) -> Option<i64>;

    /// The value as a floating point number, if it is one.
    fn as_number(&self) -> Option<f64>;

    fn as_str(&self) -> Option<&str>;

    fn as_table(&self) -> Option<&Self::Table>;

    fn from_integer(value: i64) -> Self;

    fn from_number(value: f64) -> Self;

    fn from_string(value: String) -> Self;

    fn from_table(table: Self::Table) -> Self;

    fn is_nil(&self) -> bool {
        self.kind() == ValueKind::Nil
    }
}

/// A host table keyed by field name.
pub trait ScriptTable: Sized {
    type Value: ScriptValue<Table = Self>;

    /// Construct an empty table.
    fn new_table() -> Self;

    /// Look up a field. `None` and a nil value both mean "absent".
    fn get(&self, key: &str) -> Option<&Self::Value>;

    /// Set a field. Decoding calls this in descriptor order.
    fn set_field(&mut self, key: &str, value: Self::Value);
}
