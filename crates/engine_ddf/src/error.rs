//! Descriptor-level error types.

/// A descriptor breaks one of the layout invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    /// A field extends past the end of the record's fixed region.
    #[error("field '{field}' of '{record}' spans {offset}..{end}, past fixed size {fixed_size}")]
    FieldOutOfBounds {
        record: String,
        field: String,
        offset: usize,
        end: usize,
        fixed_size: usize,
    },

    /// Two fields share bytes of the fixed region.
    #[error("fields '{first}' and '{second}' of '{record}' overlap")]
    OverlappingFields {
        record: String,
        first: String,
        second: String,
    },

    /// Two fields share a name.
    #[error("duplicate field '{field}' in '{record}'")]
    DuplicateField { record: String, field: String },
}

/// Errors raised while reading or writing a descriptor bundle.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// Failed to encode the descriptor set to MessagePack.
    #[error("failed to encode descriptor bundle: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode the descriptor set from MessagePack.
    #[error("failed to decode descriptor bundle: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// The bundle decoded but holds an inconsistent descriptor.
    #[error("invalid descriptor in bundle: {0}")]
    Invalid(#[from] DescriptorError),
}
