//! C-compatible layout of a field list.
//!
//! [`RecordLayout`] places fields the way a C compiler lays out the struct a
//! descriptor generator emits next to the descriptor: each field at the next
//! offset aligned to its natural alignment, and the total size rounded up to
//! the largest alignment.

use std::sync::Arc;

use crate::descriptor::{FieldDescriptor, RecordDescriptor};
use crate::error::DescriptorError;
use crate::kind::{FieldKind, Label};

/// Incremental builder computing offsets and the padded fixed size.
///
/// ```rust
/// use engine_ddf::{FieldKind, RecordLayout};
///
/// let desc = RecordLayout::new("Tagged")
///     .required("count", FieldKind::Int32)
///     .optional("label", FieldKind::String)
///     .build()
///     .unwrap();
///
/// assert_eq!(desc.field("label").unwrap().offset, 8);
/// assert_eq!(desc.fixed_size, 16);
/// ```
#[derive(Debug, Clone)]
pub struct RecordLayout {
    name: String,
    fields: Vec<FieldDescriptor>,
    cursor: usize,
    alignment: usize,
}

impl RecordLayout {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            cursor: 0,
            alignment: 1,
        }
    }

    /// Append a field at the next naturally aligned offset.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind, label: Label) -> Self {
        let align = kind.alignment().max(1);
        let offset = align_up(self.cursor, align);
        self.cursor = offset + kind.width();
        self.alignment = self.alignment.max(align);
        self.fields.push(FieldDescriptor::new(name, kind, offset, label));
        self
    }

    #[must_use]
    pub fn required(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.field(name, kind, Label::Required)
    }

    #[must_use]
    pub fn optional(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.field(name, kind, Label::Optional)
    }

    /// Padded size the record would have with the fields added so far.
    #[must_use]
    pub fn size(&self) -> usize {
        align_up(self.cursor, self.alignment)
    }

    /// Finish the layout.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::DuplicateField`] if two fields share a name.
    pub fn build(self) -> Result<Arc<RecordDescriptor>, DescriptorError> {
        let fixed_size = self.size();
        RecordDescriptor::new(self.name, fixed_size, self.fields).into_shared()
    }
}

fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}
