//! Descriptors for the game system messages.
//!
//! The layouts match `schemas/gamesys_ddf.proto`; they are built here
//! directly so the runtime does not need the schema compiler.

use std::sync::Arc;

use engine_ddf::{DescriptorError, DescriptorSet, FieldKind, MessageId, RecordDescriptor, RecordLayout};

/// Id of the message that asks a spawn point to spawn.
pub const SPAWN_OBJECT: MessageId = MessageId::from_name("spawn_object");

/// The descriptors of one game system instance.
///
/// Message type checks compare descriptors by identity, so every component
/// and every message poster must share the same `GameSystemDdf`.
#[derive(Debug, Clone)]
pub struct GameSystemDdf {
    pub point3: Arc<RecordDescriptor>,
    pub quat: Arc<RecordDescriptor>,
    pub spawn_object: Arc<RecordDescriptor>,
    pub spawn_point_desc: Arc<RecordDescriptor>,
}

impl GameSystemDdf {
    /// Lay out the built-in records.
    ///
    /// # Errors
    ///
    /// Returns a [`DescriptorError`] if a built-in layout fails validation.
    pub fn new() -> Result<Self, DescriptorError> {
        let point3 = RecordLayout::new("Point3")
            .required("x", FieldKind::Float32)
            .required("y", FieldKind::Float32)
            .required("z", FieldKind::Float32)
            .build()?;
        let quat = RecordLayout::new("Quat")
            .required("x", FieldKind::Float32)
            .required("y", FieldKind::Float32)
            .required("z", FieldKind::Float32)
            .required("w", FieldKind::Float32)
            .build()?;
        let spawn_object = RecordLayout::new("SpawnObject")
            .required("position", FieldKind::Message(Arc::clone(&point3)))
            .required("rotation", FieldKind::Message(Arc::clone(&quat)))
            .build()?;
        let spawn_point_desc = RecordLayout::new("SpawnPointDesc")
            .required("prototype", FieldKind::String)
            .build()?;
        Ok(Self {
            point3,
            quat,
            spawn_object,
            spawn_point_desc,
        })
    }

    /// All descriptors, keyed by name.
    #[must_use]
    pub fn descriptor_set(&self) -> DescriptorSet {
        [
            &self.point3,
            &self.quat,
            &self.spawn_object,
            &self.spawn_point_desc,
        ]
        .into_iter()
        .cloned()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_schema::Schema;

    #[test]
    fn test_spawn_object_layout() {
        let ddf = GameSystemDdf::new().unwrap();
        assert_eq!(ddf.spawn_object.fixed_size, 28);
        assert_eq!(ddf.spawn_object.field("rotation").unwrap().offset, 12);
        assert_eq!(ddf.spawn_point_desc.fixed_size, 8);
    }

    #[test]
    fn test_matches_schema_file() {
        let mut schema = Schema::new();
        schema
            .load_source(include_str!("../../../schemas/gamesys_ddf.proto"))
            .unwrap();
        let compiled = schema.compile().unwrap();
        let built = GameSystemDdf::new().unwrap().descriptor_set();
        assert_eq!(compiled.names(), built.names());
        for desc in built.iter() {
            assert_eq!(compiled.get(&desc.name).map(|d| &**d), Some(&**desc));
        }
    }

    #[test]
    fn test_spawn_object_id_is_not_the_record_name() {
        let ddf = GameSystemDdf::new().unwrap();
        assert_eq!(SPAWN_OBJECT, MessageId::from_name("spawn_object"));
        assert_ne!(SPAWN_OBJECT, ddf.spawn_object.message_id());
    }
}
