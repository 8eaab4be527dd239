//! Table → packed record.
//!
//! The encoder walks a descriptor against a table in field order. Scalars
//! are written in place in the fixed region. String bytes, NUL-terminated,
//! go to the arena that follows the top-level fixed region, and the field's
//! slot receives the arena offset relative to the start of the buffer. Nested
//! records are packed into the parent's fixed region at the field offset and
//! share the parent's arena, so all strings end up densely packed in write
//! order.

use engine_ddf::{FieldDescriptor, FieldKind, RecordDescriptor, STRING_SLOT_WIDTH};
use tracing::debug;

use crate::coerce;
use crate::error::EncodeError;
use crate::host::{ScriptTable, ScriptValue};
use crate::path::FieldPath;
use crate::string_ref::{StringRef, StringSlot};

/// The result of a successful encode.
///
/// Every string slot in the buffer holds a [`StringRef::Pending`] offset
/// until [`Encoded::relocate`](crate::Encoded::relocate) resolves it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "string slots hold relative offsets until the buffer is relocated"]
pub struct Encoded {
    pub(crate) size: usize,
    pub(crate) strings: Vec<StringSlot>,
}

impl Encoded {
    /// Bytes used: the fixed region plus every string written to the arena.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// String slots in the order they were written.
    #[must_use]
    pub fn strings(&self) -> &[StringSlot] {
        &self.strings
    }
}

/// The buffer being filled and the arena write position, threaded through
/// the recursion.
struct Arena<'b> {
    buffer: &'b mut [u8],
    cursor: usize,
    strings: Vec<StringSlot>,
}

impl Arena<'_> {
    fn write(&mut self, at: usize, bytes: &[u8]) {
        self.buffer[at..at + bytes.len()].copy_from_slice(bytes);
    }

    fn push_string(
        &mut self,
        slot: usize,
        s: &str,
        path: &FieldPath<'_>,
    ) -> Result<(), EncodeError> {
        if s.as_bytes().contains(&0) {
            return Err(EncodeError::EmbeddedNul {
                field: path.to_string(),
            });
        }
        let len = s.len() + 1;
        let available = self.buffer.len() - self.cursor;
        if len > available {
            return Err(EncodeError::BufferOverflow {
                field: path.to_string(),
                needed: len,
                available,
            });
        }

        let start = self.cursor;
        self.write(start, s.as_bytes());
        self.buffer[start + s.len()] = 0;

        let target = StringRef::Pending(start as u64);
        self.write(slot, &target.to_slot());
        self.strings.push(StringSlot { slot, target });
        self.cursor += len;
        Ok(())
    }
}

/// Pack a table into `buffer`.
///
/// `buffer.len()` is the capacity: the fixed region of `descriptor` occupies
/// its start and strings are appended after it. The buffer is never grown.
/// Bytes of absent optional nested records are left untouched, so callers
/// normally pass a zeroed buffer.
///
/// # Errors
///
/// - [`EncodeError::DescriptorTooLarge`] if the fixed region exceeds the buffer.
/// - [`EncodeError::TypeMismatch`] if `record` is not a table, or a field
///   value cannot be coerced to the field's kind.
/// - [`EncodeError::MissingRequiredField`] for an absent required field.
/// - [`EncodeError::BufferOverflow`] when the arena runs out.
/// - [`EncodeError::UnsupportedFieldKind`] for kinds that cannot be packed.
pub fn encode<V: ScriptValue>(
    descriptor: &RecordDescriptor,
    record: &V,
    buffer: &mut [u8],
) -> Result<Encoded, EncodeError> {
    let table = record.as_table().ok_or_else(|| EncodeError::TypeMismatch {
        field: descriptor.name.clone(),
        expected: "table".to_string(),
        found: record.kind(),
    })?;
    encode_table(descriptor, table, buffer)
}

/// Pack a table that is already known to be one. See [`encode`].
///
/// # Errors
///
/// As for [`encode`].
pub fn encode_table<T: ScriptTable>(
    descriptor: &RecordDescriptor,
    table: &T,
    buffer: &mut [u8],
) -> Result<Encoded, EncodeError> {
    let capacity = buffer.len();
    if descriptor.fixed_size > capacity {
        return Err(EncodeError::DescriptorTooLarge {
            record: descriptor.name.clone(),
            fixed_size: descriptor.fixed_size,
            capacity,
        });
    }

    let mut arena = Arena {
        buffer,
        cursor: descriptor.fixed_size,
        strings: Vec::new(),
    };
    encode_record(descriptor, table, 0, None, &mut arena)?;

    debug!(
        record = %descriptor.name,
        size = arena.cursor,
        strings = arena.strings.len(),
        capacity,
        "packed record"
    );
    Ok(Encoded {
        size: arena.cursor,
        strings: arena.strings,
    })
}

/// Allocate a zeroed buffer of `capacity` bytes, pack into it, and truncate
/// it to the bytes used.
///
/// # Errors
///
/// As for [`encode`].
pub fn encode_to_vec<V: ScriptValue>(
    descriptor: &RecordDescriptor,
    record: &V,
    capacity: usize,
) -> Result<(Vec<u8>, Encoded), EncodeError> {
    let mut buffer = vec![0u8; capacity];
    let encoded = encode(descriptor, record, &mut buffer)?;
    buffer.truncate(encoded.size);
    Ok((buffer, encoded))
}

fn encode_record<T: ScriptTable>(
    descriptor: &RecordDescriptor,
    table: &T,
    base: usize,
    parent: Option<&FieldPath<'_>>,
    arena: &mut Arena<'_>,
) -> Result<(), EncodeError> {
    for field in &descriptor.fields {
        let path = FieldPath::under(parent, &field.name);
        let at = descriptor.field_at(field, base)?;

        let value = table.get(&field.name).filter(|v| !v.is_nil());
        if value.is_none() && field.is_required() {
            return Err(EncodeError::MissingRequiredField {
                field: path.to_string(),
            });
        }
        encode_field(field, value, at, &path, arena)?;
    }
    Ok(())
}

fn encode_field<V: ScriptValue>(
    field: &FieldDescriptor,
    value: Option<&V>,
    at: usize,
    path: &FieldPath<'_>,
    arena: &mut Arena<'_>,
) -> Result<(), EncodeError> {
    match &field.kind {
        FieldKind::Int32 => {
            let n = value.map(|v| coerce::to_i32(v, path)).transpose()?.unwrap_or(0);
            arena.write(at, &n.to_ne_bytes());
        }
        FieldKind::UInt32 => {
            let n = value.map(|v| coerce::to_u32(v, path)).transpose()?.unwrap_or(0);
            arena.write(at, &n.to_ne_bytes());
        }
        FieldKind::Float32 => {
            let n = value.map(|v| coerce::to_f32(v, path)).transpose()?.unwrap_or(0.0);
            arena.write(at, &n.to_ne_bytes());
        }
        FieldKind::String => {
            debug_assert_eq!(field.kind.width(), STRING_SLOT_WIDTH);
            let s = value.map(|v| coerce::to_str(v, path)).transpose()?;
            arena.push_string(at, s.as_deref().unwrap_or(""), path)?;
        }
        FieldKind::Message(nested) => {
            // Absent optional messages are skipped entirely.
            if let Some(value) = value {
                let table = value
                    .as_table()
                    .ok_or_else(|| coerce::mismatch(path, "table", value.kind()))?;
                encode_record(nested, table, at, Some(path), arena)?;
            }
        }
        FieldKind::Unsupported(wire) => {
            return Err(EncodeError::UnsupportedFieldKind {
                field: path.to_string(),
                wire: *wire,
            });
        }
    }
    Ok(())
}
