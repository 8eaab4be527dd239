//! Spawn point component.
//!
//! A spawn point creates instances of its prototype when it receives a
//! `spawn_object` message. Requests are collected during the frame and
//! carried out in [`SpawnPointWorld::post_update`], at most one per spawn
//! point per frame.

use std::sync::Arc;

use engine_ddf::RecordDescriptor;
use engine_script::{DynamicRecord, DynamicValue, ScriptValue};
use glam::{Quat, Vec3};
use tracing::{debug, error, warn};

use crate::ddf::{GameSystemDdf, SPAWN_OBJECT};
use crate::error::{CreateError, MessageError};
use crate::message::InstanceMessage;

/// Configuration for a spawn point world.
#[derive(Debug, Clone)]
pub struct SpawnPointConfig {
    /// Number of component slots, at most `u32::MAX`.
    pub max_components: usize,
    /// Prefix of the ids given to spawned instances.
    pub id_prefix: String,
}

impl Default for SpawnPointConfig {
    fn default() -> Self {
        Self {
            max_components: 64,
            id_prefix: "spawn".to_string(),
        }
    }
}

impl SpawnPointConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_components(mut self, max_components: usize) -> Self {
        self.max_components = max_components;
        self
    }

    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }
}

/// Loaded spawn point data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnPointResource {
    /// Path of the prototype to instantiate.
    pub prototype: String,
}

impl SpawnPointResource {
    #[must_use]
    pub fn new(prototype: impl Into<String>) -> Self {
        Self {
            prototype: prototype.into(),
        }
    }

    /// Read a resource from a decoded `SpawnPointDesc` record.
    pub fn from_record(record: &DynamicRecord) -> Option<Self> {
        record
            .get("prototype")
            .and_then(ScriptValue::as_str)
            .map(Self::new)
    }
}

/// Receives the instances spawned during post-update.
pub trait Collection {
    fn spawn(&mut self, prototype: &str, id: &str, position: Vec3, rotation: Quat);
}

/// Slot index of a live component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentHandle(u32);

impl ComponentHandle {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct SpawnPointComponent {
    resource: Arc<SpawnPointResource>,
    position: Vec3,
    rotation: Quat,
    spawn_requested: bool,
}

/// All spawn point components of one collection.
#[derive(Debug)]
pub struct SpawnPointWorld {
    config: SpawnPointConfig,
    spawn_object: Arc<RecordDescriptor>,
    components: Vec<Option<SpawnPointComponent>>,
    /// Free slot indices; the next slot handed out is at the back.
    free: Vec<u32>,
    total_spawn_count: u32,
}

impl SpawnPointWorld {
    #[must_use]
    pub fn new(config: SpawnPointConfig, ddf: &GameSystemDdf) -> Self {
        let slots = slot_count(config.max_components);
        let free = (0..slots).rev().collect();
        Self {
            config,
            spawn_object: Arc::clone(&ddf.spawn_object),
            components: std::iter::repeat_with(|| None).take(slots as usize).collect(),
            free,
            total_spawn_count: 0,
        }
    }

    /// Number of live components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len() - self.free.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Instances spawned since the world was created.
    #[must_use]
    pub fn total_spawn_count(&self) -> u32 {
        self.total_spawn_count
    }

    pub fn create(&mut self, resource: Arc<SpawnPointResource>) -> Result<ComponentHandle, CreateError> {
        let Some(index) = self.free.pop() else {
            let capacity = self.components.len();
            error!(capacity, "spawn point buffer is full");
            return Err(CreateError::PoolFull { capacity });
        };
        self.components[index as usize] = Some(SpawnPointComponent {
            resource,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            spawn_requested: false,
        });
        Ok(ComponentHandle(index))
    }

    pub fn destroy(&mut self, handle: ComponentHandle) {
        match self.components.get_mut(handle.index()) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                self.free.push(handle.0);
            }
            _ => warn!(?handle, "destroying a spawn point that does not exist"),
        }
    }

    /// Handle a message sent to the component. Messages other than
    /// `spawn_object` are ignored.
    pub fn on_message(
        &mut self,
        handle: ComponentHandle,
        message: &InstanceMessage,
    ) -> Result<(), MessageError> {
        if message.id != SPAWN_OBJECT {
            return Ok(());
        }
        if !Arc::ptr_eq(&message.descriptor, &self.spawn_object) {
            error!(descriptor = %message.descriptor.name, "invalid DDF type for spawn_object message");
            return Err(MessageError::InvalidMessageType {
                message: message.id,
                descriptor: message.descriptor.name.clone(),
            });
        }
        let Some(component) = self
            .components
            .get_mut(handle.index())
            .and_then(Option::as_mut)
        else {
            return Err(MessageError::InvalidHandle(handle));
        };
        if component.spawn_requested {
            error!(?handle, "only one spawn per spawn point per frame, request ignored");
            return Ok(());
        }

        let record = message.decode()?;
        component.position = Vec3::from_array(floats(&record, "position", ["x", "y", "z"])?);
        component.rotation = Quat::from_array(floats(&record, "rotation", ["x", "y", "z", "w"])?);
        component.spawn_requested = true;
        Ok(())
    }

    /// Spawn every requested instance.
    pub fn post_update<C: Collection>(&mut self, collection: &mut C) {
        for component in self.components.iter_mut().flatten() {
            if !component.spawn_requested {
                continue;
            }
            let id = format!("{}{}", self.config.id_prefix, self.total_spawn_count);
            debug!(%id, prototype = %component.resource.prototype, "spawning");
            collection.spawn(
                &component.resource.prototype,
                &id,
                component.position,
                component.rotation,
            );
            component.spawn_requested = false;
            self.total_spawn_count = self.total_spawn_count.wrapping_add(1);
        }
    }
}

/// Handles are `u32`, so larger pools are clamped.
fn slot_count(max_components: usize) -> u32 {
    u32::try_from(max_components).unwrap_or(u32::MAX)
}

/// Read the numeric fields `names` of the nested record `field`.
fn floats<const N: usize>(
    record: &DynamicRecord,
    field: &str,
    names: [&str; N],
) -> Result<[f32; N], MessageError> {
    let nested = record.get(field).and_then(DynamicValue::as_record);
    let mut out = [0.0; N];
    for (slot, name) in out.iter_mut().zip(names) {
        *slot = nested
            .and_then(|r| r.get(name))
            .and_then(ScriptValue::as_number)
            .ok_or_else(|| MessageError::MalformedPayload {
                field: format!("{field}.{name}"),
            })? as f32;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_ddf::MessageId;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        spawned: Vec<(String, String, Vec3, Quat)>,
    }

    impl Collection for Recorder {
        fn spawn(&mut self, prototype: &str, id: &str, position: Vec3, rotation: Quat) {
            self.spawned
                .push((prototype.to_string(), id.to_string(), position, rotation));
        }
    }

    fn spawn_message(ddf: &GameSystemDdf, x: f32) -> InstanceMessage {
        let table = json!({
            "position": { "x": x, "y": 2.0, "z": 3.0 },
            "rotation": { "x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0 },
        });
        InstanceMessage::from_table(SPAWN_OBJECT, Arc::clone(&ddf.spawn_object), &table, 64).unwrap()
    }

    fn world(ddf: &GameSystemDdf) -> SpawnPointWorld {
        SpawnPointWorld::new(SpawnPointConfig::new(), ddf)
    }

    #[test]
    fn test_spawn_on_post_update() {
        let ddf = GameSystemDdf::new().unwrap();
        let mut world = world(&ddf);
        let handle = world
            .create(Arc::new(SpawnPointResource::new("/crate.go")))
            .unwrap();

        world.on_message(handle, &spawn_message(&ddf, 1.0)).unwrap();
        let mut collection = Recorder::default();
        world.post_update(&mut collection);
        world.post_update(&mut collection);

        assert_eq!(collection.spawned.len(), 1);
        let (prototype, id, position, rotation) = &collection.spawned[0];
        assert_eq!(prototype, "/crate.go");
        assert_eq!(id, "spawn0");
        assert_eq!(*position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(*rotation, Quat::IDENTITY);
        assert_eq!(world.total_spawn_count(), 1);
    }

    #[test]
    fn test_one_spawn_per_frame() {
        let ddf = GameSystemDdf::new().unwrap();
        let mut world = world(&ddf);
        let handle = world.create(Arc::new(SpawnPointResource::new("p"))).unwrap();

        world.on_message(handle, &spawn_message(&ddf, 1.0)).unwrap();
        world.on_message(handle, &spawn_message(&ddf, 9.0)).unwrap();
        let mut collection = Recorder::default();
        world.post_update(&mut collection);
        assert_eq!(collection.spawned.len(), 1);
        assert_eq!(collection.spawned[0].2.x, 1.0);

        world.on_message(handle, &spawn_message(&ddf, 9.0)).unwrap();
        world.post_update(&mut collection);
        assert_eq!(collection.spawned[1].1, "spawn1");
        assert_eq!(collection.spawned[1].2.x, 9.0);
    }

    #[test]
    fn test_ids_count_across_spawn_points() {
        let ddf = GameSystemDdf::new().unwrap();
        let mut world = SpawnPointWorld::new(SpawnPointConfig::new().with_id_prefix("crate_"), &ddf);
        let a = world.create(Arc::new(SpawnPointResource::new("a"))).unwrap();
        let b = world.create(Arc::new(SpawnPointResource::new("b"))).unwrap();
        world.on_message(a, &spawn_message(&ddf, 0.0)).unwrap();
        world.on_message(b, &spawn_message(&ddf, 0.0)).unwrap();

        let mut collection = Recorder::default();
        world.post_update(&mut collection);
        let ids: Vec<_> = collection.spawned.iter().map(|s| s.1.as_str()).collect();
        assert_eq!(ids, vec!["crate_0", "crate_1"]);
    }

    #[test]
    fn test_spawn_ids_wrap() {
        let ddf = GameSystemDdf::new().unwrap();
        let mut world = world(&ddf);
        world.total_spawn_count = u32::MAX;
        let handle = world.create(Arc::new(SpawnPointResource::new("p"))).unwrap();
        let mut collection = Recorder::default();

        world.on_message(handle, &spawn_message(&ddf, 0.0)).unwrap();
        world.post_update(&mut collection);
        world.on_message(handle, &spawn_message(&ddf, 0.0)).unwrap();
        world.post_update(&mut collection);

        let ids: Vec<_> = collection.spawned.iter().map(|s| s.1.as_str()).collect();
        assert_eq!(ids, vec!["spawn4294967295", "spawn0"]);
        assert_eq!(world.total_spawn_count(), 1);
    }

    #[test]
    fn test_slot_count_clamps_to_handle_range() {
        assert_eq!(slot_count(64), 64);
        assert_eq!(slot_count(u32::MAX as usize), u32::MAX);
        assert_eq!(slot_count(usize::MAX), u32::MAX);
    }

    #[test]
    fn test_pool_full() {
        let ddf = GameSystemDdf::new().unwrap();
        let mut world = SpawnPointWorld::new(SpawnPointConfig::new().with_max_components(2), &ddf);
        let resource = Arc::new(SpawnPointResource::new("p"));
        let first = world.create(Arc::clone(&resource)).unwrap();
        world.create(Arc::clone(&resource)).unwrap();
        assert_eq!(
            world.create(Arc::clone(&resource)),
            Err(CreateError::PoolFull { capacity: 2 })
        );

        world.destroy(first);
        assert_eq!(world.len(), 1);
        assert_eq!(world.create(resource), Ok(first));
    }

    #[test]
    fn test_wrong_descriptor_rejected() {
        let ddf = GameSystemDdf::new().unwrap();
        let mut world = world(&ddf);
        let handle = world.create(Arc::new(SpawnPointResource::new("p"))).unwrap();

        let table = json!({ "prototype": "p" });
        let message =
            InstanceMessage::from_table(SPAWN_OBJECT, Arc::clone(&ddf.spawn_point_desc), &table, 32)
                .unwrap();
        assert!(matches!(
            world.on_message(handle, &message),
            Err(MessageError::InvalidMessageType { ref descriptor, .. }) if descriptor == "SpawnPointDesc"
        ));

        // An equal layout from another descriptor set is still a different type.
        let other = GameSystemDdf::new().unwrap();
        assert!(matches!(
            world.on_message(handle, &spawn_message(&other, 0.0)),
            Err(MessageError::InvalidMessageType { .. })
        ));
    }

    #[test]
    fn test_other_messages_ignored() {
        let ddf = GameSystemDdf::new().unwrap();
        let mut world = world(&ddf);
        let handle = world.create(Arc::new(SpawnPointResource::new("p"))).unwrap();
        let table = json!({ "prototype": "p" });
        let message = InstanceMessage::from_table(
            MessageId::from_name("enable"),
            Arc::clone(&ddf.spawn_point_desc),
            &table,
            32,
        )
        .unwrap();
        world.on_message(handle, &message).unwrap();

        let mut collection = Recorder::default();
        world.post_update(&mut collection);
        assert!(collection.spawned.is_empty());
    }

    #[test]
    fn test_message_to_destroyed_component() {
        let ddf = GameSystemDdf::new().unwrap();
        let mut world = world(&ddf);
        let handle = world.create(Arc::new(SpawnPointResource::new("p"))).unwrap();
        world.destroy(handle);
        assert!(matches!(
            world.on_message(handle, &spawn_message(&ddf, 0.0)),
            Err(MessageError::InvalidHandle(h)) if h == handle
        ));
    }

    #[test]
    fn test_resource_from_record() {
        let record = DynamicRecord::new().with("prototype", "/level/crate.go");
        assert_eq!(
            SpawnPointResource::from_record(&record),
            Some(SpawnPointResource::new("/level/crate.go"))
        );
        assert_eq!(SpawnPointResource::from_record(&DynamicRecord::new()), None);
    }
}
