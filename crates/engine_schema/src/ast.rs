/// Abstract syntax tree types for the message IDL.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    /// Dotted package name, e.g. `dm.gamesys`.
    pub package: Option<String>,
    pub messages: Vec<MessageDef>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub label: FieldLabel,
    pub ty: TypeRef,
    pub name: String,
    /// Field number, kept for diagnostics; packing does not use it.
    pub tag: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldLabel {
    Required,
    Optional,
}

// ---------------------------------------------------------------------------
// Type references
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeRef {
    /// A built-in scalar: int32, uint32, float, double, string, bytes, ...
    Scalar(String),
    /// A message name, possibly qualified (`dmMath.Point3`).
    Named(String),
}

/// Built-in scalar type names.
pub const SCALAR_TYPES: &[&str] = &[
    "double", "float", "int64", "uint64", "int32", "fixed64", "fixed32", "bool", "string", "bytes",
    "uint32", "sfixed32", "sfixed64", "sint32", "sint64",
];

pub fn is_scalar(name: &str) -> bool {
    SCALAR_TYPES.contains(&name)
}
