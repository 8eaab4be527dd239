//! Game system components that talk through packed DDF messages.
//!
//! Scripts post messages as tables; [`InstanceMessage::from_table`] packs
//! them against a descriptor and components read them back with the
//! decoder. The spawn point is the first component built this way.

pub mod ddf;
pub mod error;
pub mod message;
pub mod spawn_point;

pub use ddf::{GameSystemDdf, SPAWN_OBJECT};
pub use error::{CreateError, MessageError};
pub use message::InstanceMessage;
pub use spawn_point::{
    Collection, ComponentHandle, SpawnPointConfig, SpawnPointResource, SpawnPointWorld,
};
