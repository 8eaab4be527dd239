//! Message identifiers.
//!
//! [`MessageId`] is derived from a message's **string name** using the FNV-1a
//! 64-bit hash, the same scheme used for component type ids. Scripts post
//! messages by name; components compare ids without touching strings.

use serde::{Deserialize, Serialize};

/// A message identifier, the FNV-1a 64-bit hash of the message name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Hash a message name.
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325
    /// for each byte in name.as_bytes():
    ///     hash = (hash XOR byte) * 0x00000100000001b3
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_is_offset_basis() {
        assert_eq!(MessageId::from_name(""), MessageId(0xcbf2_9ce4_8422_2325));
    }

    #[test]
    fn test_known_vector() {
        // FNV-1a 64 of "a".
        assert_eq!(MessageId::from_name("a"), MessageId(0xaf63_dc4c_8601_ec8c));
    }

    #[test]
    fn test_distinct_names_differ() {
        assert_ne!(
            MessageId::from_name("spawn_object"),
            MessageId::from_name("set_position")
        );
    }

    #[test]
    fn test_const_evaluation() {
        const SPAWN: MessageId = MessageId::from_name("spawn_object");
        assert_eq!(SPAWN, MessageId::from_name("spawn_object"));
    }
}
