//! Field kinds and labels.
//!
//! [`FieldKind`] is the closed set of kinds the marshaller understands, plus
//! an [`FieldKind::Unsupported`] escape hatch for wire types an external
//! generator may emit but that packed records do not carry (doubles, 64-bit
//! integers, booleans, bytes, ...). Keeping those explicit lets the encoder
//! and decoder reject them instead of misreading the fixed region.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::descriptor::RecordDescriptor;

/// Width in bytes of a string slot in the fixed region.
///
/// The slot holds a 64-bit reference: a relative offset right after encoding,
/// an absolute address after relocation.
pub const STRING_SLOT_WIDTH: usize = 8;

/// Protobuf-style wire type codes, as emitted by descriptor generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireType {
    Double,
    Float,
    Int64,
    UInt64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    UInt32,
    Enum,
    SFixed32,
    SFixed64,
    SInt32,
    SInt64,
}

impl WireType {
    /// Numeric type code (`1` = double, ... `18` = sint64).
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Double => 1,
            Self::Float => 2,
            Self::Int64 => 3,
            Self::UInt64 => 4,
            Self::Int32 => 5,
            Self::Fixed64 => 6,
            Self::Fixed32 => 7,
            Self::Bool => 8,
            Self::String => 9,
            Self::Group => 10,
            Self::Message => 11,
            Self::Bytes => 12,
            Self::UInt32 => 13,
            Self::Enum => 14,
            Self::SFixed32 => 15,
            Self::SFixed64 => 16,
            Self::SInt32 => 17,
            Self::SInt64 => 18,
        }
    }

    /// Look up a wire type by its numeric code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::Double,
            2 => Self::Float,
            3 => Self::Int64,
            4 => Self::UInt64,
            5 => Self::Int32,
            6 => Self::Fixed64,
            7 => Self::Fixed32,
            8 => Self::Bool,
            9 => Self::String,
            10 => Self::Group,
            11 => Self::Message,
            12 => Self::Bytes,
            13 => Self::UInt32,
            14 => Self::Enum,
            15 => Self::SFixed32,
            16 => Self::SFixed64,
            17 => Self::SInt32,
            18 => Self::SInt64,
            _ => return None,
        })
    }

    /// Native `(size, alignment)` of a field of this wire type in a packed
    /// record. Bytes fields are a pointer plus a 32-bit count.
    #[must_use]
    pub const fn native_layout(self) -> (usize, usize) {
        match self {
            Self::Bool => (1, 1),
            Self::Float
            | Self::Int32
            | Self::UInt32
            | Self::Fixed32
            | Self::SFixed32
            | Self::SInt32
            | Self::Enum => (4, 4),
            Self::Double
            | Self::Int64
            | Self::UInt64
            | Self::Fixed64
            | Self::SFixed64
            | Self::SInt64
            | Self::String
            | Self::Group
            | Self::Message => (8, 8),
            Self::Bytes => (16, 8),
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Int32 => "int32",
            Self::Fixed64 => "fixed64",
            Self::Fixed32 => "fixed32",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Group => "group",
            Self::Message => "message",
            Self::Bytes => "bytes",
            Self::UInt32 => "uint32",
            Self::Enum => "enum",
            Self::SFixed32 => "sfixed32",
            Self::SFixed64 => "sfixed64",
            Self::SInt32 => "sint32",
            Self::SInt64 => "sint64",
        };
        write!(f, "{name}")
    }
}

/// Whether a field must be present in the dynamic record being packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Required,
    Optional,
}

impl Label {
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Required)
    }
}

/// The kind of a field, which decides its width and how it is packed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Single precision float.
    Float32,
    /// NUL-terminated string stored in the trailing arena, referenced by an
    /// 8-byte slot in the fixed region.
    String,
    /// A nested record packed inline at the field's offset.
    Message(Arc<RecordDescriptor>),
    /// A wire type the marshaller does not pack.
    Unsupported(WireType),
}

impl FieldKind {
    /// The wire type this kind corresponds to.
    #[must_use]
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Int32 => WireType::Int32,
            Self::UInt32 => WireType::UInt32,
            Self::Float32 => WireType::Float,
            Self::String => WireType::String,
            Self::Message(_) => WireType::Message,
            Self::Unsupported(wire) => *wire,
        }
    }

    /// Width in bytes occupied in the enclosing fixed region.
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::String => STRING_SLOT_WIDTH,
            Self::Message(nested) => nested.fixed_size,
            Self::Unsupported(wire) => wire.native_layout().0,
        }
    }

    /// Natural alignment in bytes.
    #[must_use]
    pub fn alignment(&self) -> usize {
        match self {
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::String => STRING_SLOT_WIDTH,
            Self::Message(nested) => nested.alignment(),
            Self::Unsupported(wire) => wire.native_layout().1,
        }
    }

    /// Returns the nested descriptor for message fields.
    #[must_use]
    pub fn message(&self) -> Option<&Arc<RecordDescriptor>> {
        match self {
            Self::Message(nested) => Some(nested),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(nested) => write!(f, "message {}", nested.name),
            other => write!(f, "{}", other.wire_type()),
        }
    }
}
