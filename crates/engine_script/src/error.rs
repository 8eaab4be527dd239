//! Marshalling error types.
//!
//! Field names in errors are dotted paths from the top-level record, e.g.
//! `position.x`.

use engine_ddf::{DescriptorError, WireType};

use crate::host::ValueKind;

/// Errors raised while packing a table. Any error aborts the whole encode;
/// the buffer contents are unspecified afterwards and must be discarded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    /// The record's fixed region does not fit in the buffer.
    #[error("sizeof({record}) = {fixed_size} > {capacity}")]
    DescriptorTooLarge {
        record: String,
        fixed_size: usize,
        capacity: usize,
    },

    /// A required field is absent from the table.
    #[error("field {field} not specified in table")]
    MissingRequiredField { field: String },

    /// The field's kind cannot be packed.
    #[error("unsupported type {wire} in field {field}")]
    UnsupportedFieldKind { field: String, wire: WireType },

    /// The string arena is exhausted.
    #[error("data for field {field} doesn't fit: need {needed} bytes, {available} available")]
    BufferOverflow {
        field: String,
        needed: usize,
        available: usize,
    },

    /// The value's runtime type cannot be coerced to the field's kind.
    #[error("field {field}: expected {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: ValueKind,
    },

    /// A string value contains a NUL byte, which would truncate it.
    #[error("field {field}: string contains an embedded NUL byte")]
    EmbeddedNul { field: String },

    /// The descriptor places a field outside its record's fixed region.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Errors raised while reading a resolved buffer.
///
/// Only [`DecodeError::UnsupportedFieldKind`] can occur on a buffer produced
/// by encoding and relocating with the same descriptor; the remaining
/// variants guard against a descriptor and a buffer that disagree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported type {wire} in field {field}")]
    UnsupportedFieldKind { field: String, wire: WireType },

    /// A field or string lies outside the buffer.
    #[error("field {field}: bytes {offset}..{end} outside buffer of {len} bytes")]
    OutOfBounds {
        field: String,
        offset: u64,
        end: u64,
        len: usize,
    },

    /// A string runs to the end of the buffer without a terminator.
    #[error("field {field}: string at {offset} is not terminated")]
    UnterminatedString { field: String, offset: usize },

    /// A string is not valid UTF-8.
    #[error("field {field}: string is not valid UTF-8")]
    InvalidString { field: String },

    /// The descriptor places a field outside its record's fixed region.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Errors raised while resolving string slots.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelocateError {
    /// The buffer is shorter than what was encoded into it.
    #[error("buffer of {len} bytes is shorter than the {size} encoded bytes")]
    BufferTooSmall { len: usize, size: usize },

    /// `base + offset` does not fit in an address.
    #[error("relocating offset {offset} against base {base:#x} overflows")]
    AddressOverflow { base: u64, offset: u64 },
}
