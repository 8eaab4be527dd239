//! Message IDL for packed engine data.
//!
//! A schema is a set of `message` blocks with `required` / `optional`
//! fields. [`Schema::compile`] resolves message references and lays every
//! message out with C struct rules, producing the [`engine_ddf::DescriptorSet`]
//! the packing code works from.
//!
//! ```
//! use engine_schema::Schema;
//!
//! let mut schema = Schema::new();
//! schema
//!     .load_source("message Vector3 { required float x; required float y; required float z; }")
//!     .unwrap();
//! let set = schema.compile().unwrap();
//! assert_eq!(set.get("Vector3").unwrap().fixed_size, 12);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod schema;

pub use schema::{Schema, SchemaError, describe};
