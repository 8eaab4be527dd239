//! Packed record → table.

use engine_ddf::{FieldDescriptor, FieldKind, RecordDescriptor, STRING_SLOT_WIDTH};
use tracing::debug;

use crate::error::DecodeError;
use crate::host::{ScriptTable, ScriptValue};
use crate::path::FieldPath;
use crate::relocate::ResolvedBuffer;
use crate::value::DynamicRecord;

/// Read a resolved buffer into a [`DynamicRecord`].
///
/// Fields are inserted in descriptor order. Int32 values are sign-extended,
/// UInt32 values zero-extended, and Float32 values widened.
///
/// # Errors
///
/// Returns [`DecodeError::UnsupportedFieldKind`] for kinds that are not
/// packed. The other variants only occur when `buffer` was not produced with
/// `descriptor`.
pub fn decode(
    descriptor: &RecordDescriptor,
    buffer: &ResolvedBuffer<'_>,
) -> Result<DynamicRecord, DecodeError> {
    decode_into(descriptor, buffer)
}

/// Read a resolved buffer into any host table type. See [`decode`].
///
/// # Errors
///
/// As for [`decode`].
pub fn decode_into<T: ScriptTable>(
    descriptor: &RecordDescriptor,
    buffer: &ResolvedBuffer<'_>,
) -> Result<T, DecodeError> {
    let table = decode_record(descriptor, buffer, 0, None)?;
    debug!(record = %descriptor.name, fields = descriptor.fields.len(), "unpacked record");
    Ok(table)
}

fn decode_record<T: ScriptTable>(
    descriptor: &RecordDescriptor,
    buffer: &ResolvedBuffer<'_>,
    base: usize,
    parent: Option<&FieldPath<'_>>,
) -> Result<T, DecodeError> {
    let mut table = T::new_table();
    for field in &descriptor.fields {
        let path = FieldPath::under(parent, &field.name);
        let at = descriptor.field_at(field, base)?;
        let value = decode_field::<T::Value>(field, buffer, at, &path)?;
        table.set_field(&field.name, value);
    }
    Ok(table)
}

fn decode_field<V: ScriptValue>(
    field: &FieldDescriptor,
    buffer: &ResolvedBuffer<'_>,
    at: usize,
    path: &FieldPath<'_>,
) -> Result<V, DecodeError> {
    let located = |e| with_path(e, path);
    let value = match &field.kind {
        FieldKind::Int32 => {
            let n = i32::from_ne_bytes(buffer.read(at, &field.name).map_err(located)?);
            V::from_integer(n.into())
        }
        FieldKind::UInt32 => {
            let n = u32::from_ne_bytes(buffer.read(at, &field.name).map_err(located)?);
            V::from_integer(n.into())
        }
        FieldKind::Float32 => {
            let n = f32::from_ne_bytes(buffer.read(at, &field.name).map_err(located)?);
            V::from_number(n.into())
        }
        FieldKind::String => {
            debug_assert_eq!(field.kind.width(), STRING_SLOT_WIDTH);
            V::from_string(buffer.read_string(at, &field.name).map_err(located)?)
        }
        FieldKind::Message(nested) => {
            V::from_table(decode_record::<V::Table>(nested, buffer, at, Some(path))?)
        }
        FieldKind::Unsupported(wire) => {
            return Err(DecodeError::UnsupportedFieldKind {
                field: path.to_string(),
                wire: *wire,
            });
        }
    };
    Ok(value)
}

/// Replace the bare field name recorded by buffer reads with the full path.
fn with_path(error: DecodeError, path: &FieldPath<'_>) -> DecodeError {
    let field = path.to_string();
    match error {
        DecodeError::OutOfBounds {
            offset, end, len, ..
        } => DecodeError::OutOfBounds {
            field,
            offset,
            end,
            len,
        },
        DecodeError::UnterminatedString { offset, .. } => {
            DecodeError::UnterminatedString { field, offset }
        }
        DecodeError::InvalidString { .. } => DecodeError::InvalidString { field },
        other => other,
    }
}
