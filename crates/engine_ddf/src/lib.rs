//! # engine_ddf
//!
//! Reflection descriptors for packed engine data ("DDF" records).
//!
//! A descriptor tells the marshaller how a record is laid out in memory: the
//! width of its fixed region, and for every field its name, kind, byte offset
//! and label. Descriptors are passive data. They are produced by the schema
//! compiler (`engine_schema`), by hand with [`RecordLayout`], or loaded from a
//! MessagePack bundle, and are read-only once built.
//!
//! This crate provides:
//!
//! - [`RecordDescriptor`] / [`FieldDescriptor`]: the descriptor tree.
//! - [`FieldKind`] / [`WireType`] / [`Label`]: the closed set of field kinds.
//! - [`RecordLayout`]: computes C-compatible offsets for a field list.
//! - [`DescriptorSet`]: a named collection of descriptors, shippable as a bundle.
//! - [`MessageId`]: FNV-1a identifiers for message names.

pub mod descriptor;
pub mod error;
pub mod kind;
pub mod layout;
pub mod message_id;
pub mod set;

pub use descriptor::{FieldDescriptor, RecordDescriptor};
pub use error::{BundleError, DescriptorError};
pub use kind::{FieldKind, Label, STRING_SLOT_WIDTH, WireType};
pub use layout::RecordLayout;
pub use message_id::MessageId;
pub use set::DescriptorSet;
