//! String slot contents before and after relocation.
//!
//! A string field's slot in the fixed region is an 8-byte reference. Right
//! after encoding it holds the offset of the string bytes from the start of
//! the buffer, because the buffer's final address is not known yet. Whoever
//! places the buffer at its final location resolves every pending slot into
//! an absolute address. Readers only ever accept resolved references.

use engine_ddf::STRING_SLOT_WIDTH;

use crate::error::RelocateError;

/// The content of a string slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringRef {
    /// Offset of the string bytes from the start of the top-level buffer.
    Pending(u64),
    /// Absolute address of the string bytes.
    Resolved(u64),
}

impl StringRef {
    /// Resolve a pending reference against the absolute address of the
    /// buffer's first byte. Resolved references are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RelocateError::AddressOverflow`] if `base + offset` wraps.
    pub fn resolve(self, base: u64) -> Result<Self, RelocateError> {
        match self {
            Self::Pending(offset) => base
                .checked_add(offset)
                .map(Self::Resolved)
                .ok_or(RelocateError::AddressOverflow { base, offset }),
            resolved @ Self::Resolved(_) => Ok(resolved),
        }
    }

    /// The raw 64-bit value stored in the slot.
    #[must_use]
    pub const fn bits(self) -> u64 {
        match self {
            Self::Pending(v) | Self::Resolved(v) => v,
        }
    }

    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The slot bytes, in native byte order.
    #[must_use]
    pub const fn to_slot(self) -> [u8; STRING_SLOT_WIDTH] {
        self.bits().to_ne_bytes()
    }
}

/// A string slot written by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringSlot {
    /// Offset of the slot from the start of the top-level buffer.
    pub slot: usize,
    /// What the slot currently holds.
    pub target: StringRef,
}
