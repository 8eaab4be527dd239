//! # engine_script
//!
//! Marshalling between script tables and packed DDF records.
//!
//! Scripts work with free-form keyed tables; engine components work with
//! packed records laid out by a [`RecordDescriptor`](engine_ddf::RecordDescriptor).
//! This crate converts between the two:
//!
//! 1. [`encode`] walks a descriptor against a table, writing scalars into the
//!    fixed region and string bytes into the trailing arena. String slots hold
//!    a *relative* offset at this point ([`StringRef::Pending`]).
//! 2. [`Encoded::relocate`] rewrites every pending slot into an absolute
//!    address ([`StringRef::Resolved`]) once the buffer's final location is
//!    known, and hands back a [`ResolvedBuffer`].
//! 3. [`decode`] reads a resolved buffer back into a table.
//!
//! Tables are accessed through the [`ScriptValue`] / [`ScriptTable`] traits,
//! implemented here for [`DynamicValue`] and for `serde_json::Value`.
//!
//! ```rust
//! use engine_ddf::{FieldKind, RecordLayout};
//! use engine_script::{DynamicRecord, DynamicValue, decode, encode};
//!
//! let desc = RecordLayout::new("Greeting")
//!     .required("count", FieldKind::Int32)
//!     .required("text", FieldKind::String)
//!     .build()
//!     .unwrap();
//!
//! let mut record = DynamicRecord::new();
//! record.set("count", 3);
//! record.set("text", "hello");
//!
//! let mut buffer = vec![0u8; 64];
//! let encoded = encode(&desc, &DynamicValue::Table(record.clone()), &mut buffer).unwrap();
//! let resolved = encoded.relocate_in_place(&mut buffer).unwrap();
//! let decoded = decode(&desc, &resolved).unwrap();
//! assert_eq!(decoded, record);
//! ```

pub mod coerce;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod host;
pub mod json;
pub mod path;
pub mod relocate;
pub mod string_ref;
pub mod value;

pub use decoder::{decode, decode_into};
pub use encoder::{Encoded, encode, encode_table, encode_to_vec};
pub use error::{DecodeError, EncodeError, RelocateError};
pub use host::{ScriptTable, ScriptValue, ValueKind};
pub use relocate::ResolvedBuffer;
pub use string_ref::{StringRef, StringSlot};
pub use value::{DynamicRecord, DynamicValue};
