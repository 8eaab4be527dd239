//! Messages posted to component instances.

use std::sync::Arc;

use engine_ddf::{MessageId, RecordDescriptor};
use engine_script::{DecodeError, DynamicRecord, ResolvedBuffer, ScriptValue, decode, encode_to_vec};
use tracing::debug;

use crate::error::MessageError;

/// A message with its packed payload.
///
/// The payload owns its bytes; string slots were resolved against `base`
/// when the message was built.
#[derive(Debug, Clone)]
pub struct InstanceMessage {
    pub id: MessageId,
    pub descriptor: Arc<RecordDescriptor>,
    payload: Vec<u8>,
    base: u64,
}

impl InstanceMessage {
    /// Pack a script table as the payload of message `id`.
    ///
    /// `capacity` bounds the packed size, fixed region and strings together.
    pub fn from_table<V: ScriptValue>(
        id: MessageId,
        descriptor: Arc<RecordDescriptor>,
        table: &V,
        capacity: usize,
    ) -> Result<Self, MessageError> {
        let (mut payload, encoded) = encode_to_vec(&descriptor, table, capacity)?;
        let base = encoded.relocate_in_place(&mut payload)?.base();
        debug!(message = %id, record = %descriptor.name, size = payload.len(), "built message");
        Ok(Self {
            id,
            descriptor,
            payload,
            base,
        })
    }

    #[must_use]
    pub fn payload(&self) -> ResolvedBuffer<'_> {
        ResolvedBuffer::new(&self.payload, self.base)
    }

    pub fn decode(&self) -> Result<DynamicRecord, DecodeError> {
        decode(&self.descriptor, &self.payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddf::{GameSystemDdf, SPAWN_OBJECT};
    use engine_script::{DynamicValue, EncodeError};
    use serde_json::json;

    #[test]
    fn test_from_json_table() {
        let ddf = GameSystemDdf::new().unwrap();
        let table = json!({ "prototype": "/main/crate.goc" });
        let message = InstanceMessage::from_table(
            MessageId::from_name("set_prototype"),
            Arc::clone(&ddf.spawn_point_desc),
            &table,
            64,
        )
        .unwrap();
        assert_eq!(message.payload().bytes().len(), 8 + 16);
        let decoded = message.decode().unwrap();
        assert_eq!(decoded.get("prototype"), Some(&DynamicValue::from("/main/crate.goc")));
    }

    #[test]
    fn test_payload_survives_clone() {
        let ddf = GameSystemDdf::new().unwrap();
        let table = json!({ "prototype": "a" });
        let message =
            InstanceMessage::from_table(SPAWN_OBJECT, Arc::clone(&ddf.spawn_point_desc), &table, 16)
                .unwrap();
        let copy = message.clone();
        drop(message);
        assert_eq!(
            copy.decode().unwrap().get("prototype"),
            Some(&DynamicValue::from("a"))
        );
    }

    #[test]
    fn test_capacity_exceeded() {
        let ddf = GameSystemDdf::new().unwrap();
        let table = json!({ "prototype": "too long for this" });
        let err = InstanceMessage::from_table(SPAWN_OBJECT, Arc::clone(&ddf.spawn_point_desc), &table, 12)
            .unwrap_err();
        assert!(matches!(
            err,
            MessageError::Encode(EncodeError::BufferOverflow { .. })
        ));
    }
}
