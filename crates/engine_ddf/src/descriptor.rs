//! The descriptor tree: [`RecordDescriptor`] and [`FieldDescriptor`].

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;
use crate::kind::{FieldKind, Label};
use crate::message_id::MessageId;

/// One field of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Key used to look the field up in a dynamic record.
    pub name: String,
    /// What is stored at `offset`.
    pub kind: FieldKind,
    /// Byte offset into the enclosing fixed region.
    pub offset: usize,
    /// Required fields must be present when packing.
    pub label: Label,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind, offset: usize, label: Label) -> Self {
        Self {
            name: name.into(),
            kind,
            offset,
            label,
        }
    }

    /// Shorthand for a required field.
    #[must_use]
    pub fn required(name: impl Into<String>, kind: FieldKind, offset: usize) -> Self {
        Self::new(name, kind, offset, Label::Required)
    }

    /// Shorthand for an optional field.
    #[must_use]
    pub fn optional(name: impl Into<String>, kind: FieldKind, offset: usize) -> Self {
        Self::new(name, kind, offset, Label::Optional)
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.label.is_required()
    }

    /// One past the last byte this field occupies in the fixed region, or
    /// `None` if that is not addressable.
    #[must_use]
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.kind.width())
    }
}

/// Layout of a record kind: its fixed region and ordered fields.
///
/// Field order is significant: it is the packing order, and decoded records
/// list their keys in this order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDescriptor {
    /// Diagnostic name (e.g. `"SpawnObject"`).
    pub name: String,
    /// Width of the fixed region, including padding.
    pub fixed_size: usize,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, fixed_size: usize, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            fixed_size,
            fields,
        }
    }

    /// Validate and wrap in an [`Arc`] so the descriptor can be nested and
    /// shared across threads.
    ///
    /// # Errors
    ///
    /// Returns the first [`DescriptorError`] found by [`Self::validate`].
    pub fn into_shared(self) -> Result<Arc<Self>, DescriptorError> {
        self.validate()?;
        Ok(Arc::new(self))
    }

    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Identifier derived from the record name.
    #[must_use]
    pub fn message_id(&self) -> MessageId {
        MessageId::from_name(&self.name)
    }

    /// Largest field alignment, at least 1.
    #[must_use]
    pub fn alignment(&self) -> usize {
        self.fields
            .iter()
            .map(|f| f.kind.alignment())
            .max()
            .unwrap_or(1)
    }

    /// Check the layout invariants, recursing into nested records: every
    /// field lies within `fixed_size`, no two fields overlap, and field names
    /// are unique.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                return Err(DescriptorError::DuplicateField {
                    record: self.name.clone(),
                    field: field.name.clone(),
                });
            }
            self.field_end(field)?;
            if let FieldKind::Message(nested) = &field.kind {
                nested.validate()?;
            }
        }

        let mut by_offset: Vec<&FieldDescriptor> = self.fields.iter().collect();
        by_offset.sort_by_key(|f| f.offset);
        for pair in by_offset.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            // Zero-width fields (empty nested records) never overlap.
            let a_end = self.field_end(a)?;
            if a.kind.width() > 0 && b.kind.width() > 0 && a_end > b.offset {
                return Err(DescriptorError::OverlappingFields {
                    record: self.name.clone(),
                    first: a.name.clone(),
                    second: b.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// End offset of `field`, checked against this record's fixed region.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::FieldOutOfBounds`] if the field extends past
    /// `fixed_size` or its end overflows.
    pub fn field_end(&self, field: &FieldDescriptor) -> Result<usize, DescriptorError> {
        field
            .end()
            .filter(|&end| end <= self.fixed_size)
            .ok_or_else(|| DescriptorError::FieldOutOfBounds {
                record: self.name.clone(),
                field: field.name.clone(),
                offset: field.offset,
                end: field.offset.saturating_add(field.kind.width()),
                fixed_size: self.fixed_size,
            })
    }

    /// Absolute offset of `field` for a record whose fixed region starts at
    /// `base`.
    ///
    /// # Errors
    ///
    /// As for [`Self::field_end`], and [`DescriptorError::FieldOutOfBounds`]
    /// if `base + offset` overflows.
    pub fn field_at(&self, field: &FieldDescriptor, base: usize) -> Result<usize, DescriptorError> {
        self.field_end(field)?;
        base.checked_add(field.offset)
            .ok_or_else(|| DescriptorError::FieldOutOfBounds {
                record: self.name.clone(),
                field: field.name.clone(),
                offset: field.offset,
                end: usize::MAX,
                fixed_size: self.fixed_size,
            })
    }

    /// Nesting depth: 1 for a record without message fields.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .fields
            .iter()
            .filter_map(|f| f.kind.message())
            .map(|nested| nested.depth())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inner() -> Arc<RecordDescriptor> {
        RecordDescriptor::new(
            "Inner",
            8,
            vec![FieldDescriptor::required("s", FieldKind::String, 0)],
        )
        .into_shared()
        .unwrap()
    }

    #[test]
    fn test_validate_accepts_padded_layout() {
        let desc = RecordDescriptor::new(
            "Padded",
            16,
            vec![
                FieldDescriptor::required("a", FieldKind::Int32, 0),
                FieldDescriptor::required("s", FieldKind::String, 8),
            ],
        );
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_field_past_end() {
        let desc = RecordDescriptor::new(
            "Short",
            4,
            vec![FieldDescriptor::required("s", FieldKind::String, 0)],
        );
        assert!(matches!(
            desc.validate(),
            Err(DescriptorError::FieldOutOfBounds { end: 8, fixed_size: 4, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unaddressable_offset() {
        let desc = RecordDescriptor::new(
            "Far",
            8,
            vec![FieldDescriptor::optional("n", FieldKind::Int32, usize::MAX - 1)],
        );
        assert_eq!(desc.fields[0].end(), None);
        assert!(matches!(
            desc.validate(),
            Err(DescriptorError::FieldOutOfBounds { end: usize::MAX, fixed_size: 8, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let desc = RecordDescriptor::new(
            "Overlap",
            8,
            vec![
                FieldDescriptor::required("a", FieldKind::Int32, 0),
                FieldDescriptor::required("b", FieldKind::Float32, 2),
            ],
        );
        assert!(matches!(
            desc.validate(),
            Err(DescriptorError::OverlappingFields { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let desc = RecordDescriptor::new(
            "Dup",
            8,
            vec![
                FieldDescriptor::required("a", FieldKind::Int32, 0),
                FieldDescriptor::required("a", FieldKind::Int32, 4),
            ],
        );
        assert!(matches!(
            desc.validate(),
            Err(DescriptorError::DuplicateField { .. })
        ));
    }

    #[test]
    fn test_validate_recurses_into_nested() {
        let bad_inner = Arc::new(RecordDescriptor::new(
            "BadInner",
            2,
            vec![FieldDescriptor::required("x", FieldKind::Int32, 0)],
        ));
        let outer = RecordDescriptor::new(
            "Outer",
            2,
            vec![FieldDescriptor::required("inner", FieldKind::Message(bad_inner), 0)],
        );
        assert!(matches!(
            outer.validate(),
            Err(DescriptorError::FieldOutOfBounds { ref record, .. }) if record == "BadInner"
        ));
    }

    #[test]
    fn test_depth_and_alignment() {
        let outer = RecordDescriptor::new(
            "Outer",
            12,
            vec![
                FieldDescriptor::required("n", FieldKind::Int32, 0),
                FieldDescriptor::required("inner", FieldKind::Message(inner()), 4),
            ],
        );
        assert_eq!(outer.depth(), 2);
        assert_eq!(outer.alignment(), 8);
        assert_eq!(outer.field("n").unwrap().offset, 0);
        assert!(outer.field("missing").is_none());
    }
}
