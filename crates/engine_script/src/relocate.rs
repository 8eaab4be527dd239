//! Resolving string slots into absolute addresses.
//!
//! Encoding cannot know where the buffer will finally live: a message is
//! usually packed into scratch space and then copied into a queue. Whoever
//! owns the final location calls [`Encoded::relocate`] with the address of
//! the buffer's first byte, and gets back a [`ResolvedBuffer`] that the
//! decoder accepts.

use engine_ddf::STRING_SLOT_WIDTH;

use crate::encoder::Encoded;
use crate::error::{DecodeError, RelocateError};
use crate::string_ref::StringRef;

impl Encoded {
    /// Rewrite every pending string slot in `buffer` into
    /// `StringRef::Resolved(base + offset)`.
    ///
    /// `buffer` must hold the encoded bytes (at least [`Encoded::size`] of
    /// them, possibly after a copy) and `base` is the absolute address its
    /// first byte has for the consumer.
    ///
    /// # Errors
    ///
    /// - [`RelocateError::BufferTooSmall`] if `buffer` is shorter than the
    ///   encoded size.
    /// - [`RelocateError::AddressOverflow`] if an address does not fit in 64 bits.
    pub fn relocate(mut self, buffer: &mut [u8], base: u64) -> Result<ResolvedBuffer<'_>, RelocateError> {
        if buffer.len() < self.size {
            return Err(RelocateError::BufferTooSmall {
                len: buffer.len(),
                size: self.size,
            });
        }
        for string in &mut self.strings {
            let resolved = string.target.resolve(base)?;
            buffer[string.slot..string.slot + STRING_SLOT_WIDTH].copy_from_slice(&resolved.to_slot());
            string.target = resolved;
        }
        Ok(ResolvedBuffer { bytes: buffer, base })
    }

    /// Relocate against the buffer's own address, for buffers consumed where
    /// they were encoded.
    ///
    /// # Errors
    ///
    /// As for [`Encoded::relocate`].
    pub fn relocate_in_place(self, buffer: &mut [u8]) -> Result<ResolvedBuffer<'_>, RelocateError> {
        let base = address_of(buffer);
        self.relocate(buffer, base)
    }
}

/// A packed record whose string slots hold absolute addresses.
///
/// Addresses are interpreted relative to `base`, the address that was used
/// for relocation, so reads are bounds-checked against `bytes` rather than
/// dereferenced.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedBuffer<'a> {
    bytes: &'a [u8],
    base: u64,
}

impl<'a> ResolvedBuffer<'a> {
    /// Wrap bytes whose string slots were resolved against `base`, e.g. a
    /// record built natively or relocated by another component.
    #[must_use]
    pub fn new(bytes: &'a [u8], base: u64) -> Self {
        Self { bytes, base }
    }

    /// Wrap bytes whose string slots hold addresses inside `bytes` itself.
    #[must_use]
    pub fn native(bytes: &'a [u8]) -> Self {
        Self::new(bytes, address_of(bytes))
    }

    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[must_use]
    pub fn base(&self) -> u64 {
        self.base
    }

    pub(crate) fn read<const N: usize>(&self, at: usize, field: &str) -> Result<[u8; N], DecodeError> {
        at.checked_add(N)
            .and_then(|end| self.bytes.get(at..end))
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| DecodeError::OutOfBounds {
                field: field.to_string(),
                offset: at as u64,
                end: (at as u64).saturating_add(N as u64),
                len: self.bytes.len(),
            })
    }

    /// Read the string slot at `at` and materialize the string it points to.
    pub(crate) fn read_string(&self, at: usize, field: &str) -> Result<String, DecodeError> {
        let target = StringRef::Resolved(u64::from_ne_bytes(self.read::<STRING_SLOT_WIDTH>(at, field)?));
        let start = self.index_of(target, field)?;
        let tail = &self.bytes[start..];
        let len = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| DecodeError::UnterminatedString {
                field: field.to_string(),
                offset: start,
            })?;
        std::str::from_utf8(&tail[..len])
            .map(str::to_string)
            .map_err(|_| DecodeError::InvalidString {
                field: field.to_string(),
            })
    }

    fn index_of(&self, target: StringRef, field: &str) -> Result<usize, DecodeError> {
        let address = target.bits();
        address
            .checked_sub(self.base)
            .and_then(|i| usize::try_from(i).ok())
            .filter(|&i| i < self.bytes.len())
            .ok_or_else(|| DecodeError::OutOfBounds {
                field: field.to_string(),
                offset: address,
                end: address.saturating_add(1),
                len: self.bytes.len(),
            })
    }
}

fn address_of(bytes: &[u8]) -> u64 {
    bytes.as_ptr() as usize as u64
}

#[cfg(test)]
mod tests {
    use engine_ddf::{FieldKind, RecordLayout};

    use super::*;
    use crate::encoder::encode;
    use crate::value::{DynamicRecord, DynamicValue};

    fn encoded_hello() -> (Vec<u8>, Encoded) {
        let desc = RecordLayout::new("Hello")
            .required("s", FieldKind::String)
            .build()
            .unwrap();
        let mut buffer = vec![0u8; 32];
        let record = DynamicValue::Table(DynamicRecord::new().with("s", "hello"));
        let encoded = encode(&desc, &record, &mut buffer).unwrap();
        (buffer, encoded)
    }

    #[test]
    fn test_relocate_against_base() {
        let (mut buffer, encoded) = encoded_hello();
        let resolved = encoded.relocate(&mut buffer, 0x10_0000).unwrap();
        assert_eq!(resolved.base(), 0x10_0000);
        let slot = u64::from_ne_bytes(resolved.bytes()[0..8].try_into().unwrap());
        assert_eq!(slot, 0x10_0000 + 8);
        assert_eq!(resolved.read_string(0, "s").unwrap(), "hello");
    }

    #[test]
    fn test_relocate_in_place_points_into_buffer() {
        let (mut buffer, encoded) = encoded_hello();
        let start = buffer.as_ptr() as usize as u64;
        let resolved = encoded.relocate_in_place(&mut buffer).unwrap();
        let slot = u64::from_ne_bytes(resolved.bytes()[0..8].try_into().unwrap());
        assert_eq!(slot, start + 8);
    }

    #[test]
    fn test_relocate_after_copy() {
        let (buffer, encoded) = encoded_hello();
        let mut copy = buffer[..encoded.size()].to_vec();
        let resolved = encoded.relocate_in_place(&mut copy).unwrap();
        assert_eq!(resolved.read_string(0, "s").unwrap(), "hello");
        assert_eq!(
            ResolvedBuffer::native(resolved.bytes()).read_string(0, "s").unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_relocate_rejects_truncated_copy() {
        let (buffer, encoded) = encoded_hello();
        let mut short = buffer[..10].to_vec();
        assert_eq!(
            encoded.relocate(&mut short, 0).unwrap_err(),
            RelocateError::BufferTooSmall { len: 10, size: 14 }
        );
    }

    #[test]
    fn test_read_string_outside_buffer() {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&500u64.to_ne_bytes());
        let view = ResolvedBuffer::new(&bytes, 0);
        assert!(matches!(
            view.read_string(0, "s"),
            Err(DecodeError::OutOfBounds { offset: 500, .. })
        ));
    }

    #[test]
    fn test_read_past_address_space() {
        let bytes = [0u8; 8];
        let view = ResolvedBuffer::new(&bytes, 0);
        assert_eq!(
            view.read::<4>(usize::MAX - 1, "n"),
            Err(DecodeError::OutOfBounds {
                field: "n".into(),
                offset: (usize::MAX - 1) as u64,
                end: u64::MAX,
                len: 8,
            })
        );
    }

    #[test]
    fn test_read_string_below_base() {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&4u64.to_ne_bytes());
        let view = ResolvedBuffer::new(&bytes, 0x1000);
        assert!(matches!(
            view.read_string(0, "s"),
            Err(DecodeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_unterminated_string() {
        let mut bytes = vec![0u8; 8];
        bytes.extend_from_slice(b"abc");
        bytes[0..8].copy_from_slice(&8u64.to_ne_bytes());
        let view = ResolvedBuffer::new(&bytes, 0);
        assert_eq!(
            view.read_string(0, "s"),
            Err(DecodeError::UnterminatedString {
                field: "s".into(),
                offset: 8
            })
        );
    }
}
