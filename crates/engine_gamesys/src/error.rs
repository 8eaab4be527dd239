use engine_ddf::MessageId;
use engine_script::{DecodeError, EncodeError, RelocateError};
use thiserror::Error;

use crate::spawn_point::ComponentHandle;

/// Errors from creating a component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error("can not create more spawn point components since the buffer is full ({capacity})")]
    PoolFull { capacity: usize },
}

/// Errors from building or handling an instance message.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("invalid DDF type '{descriptor}' for message {message}")]
    InvalidMessageType {
        message: MessageId,
        descriptor: String,
    },

    #[error("no live component for handle {0:?}")]
    InvalidHandle(ComponentHandle),

    #[error("message field '{field}' is not a number")]
    MalformedPayload { field: String },

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Relocate(#[from] RelocateError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
