/// Resolved schema registry: collects messages from parsed files and lays
/// them out as packed record descriptors.
use crate::ast::*;
use crate::parser::Parser;
use engine_ddf::{
    DescriptorError, DescriptorSet, FieldKind, Label, RecordDescriptor, RecordLayout, WireType,
};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("parse error: {0}")]
    Parse(#[from] crate::parser::ParseError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("duplicate type: {0}")]
    DuplicateType(String),
    #[error("unknown type '{ty}' for field '{message}.{field}'")]
    UnknownType {
        message: String,
        field: String,
        ty: String,
    },
    #[error("message contains itself: {0}")]
    CyclicMessage(String),
    #[error("invalid layout: {0}")]
    Layout(#[from] DescriptorError),
}

/// All message definitions loaded so far.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Message definitions keyed by their short name.
    pub messages: BTreeMap<String, MessageDef>,
    /// Package-qualified name -> short name.
    qualified: HashMap<String, String>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a schema file and merge its definitions into this schema.
    pub fn load_file(&mut self, path: &Path) -> Result<(), SchemaError> {
        let source = std::fs::read_to_string(path)?;
        self.load_source(&source)
    }

    /// Parse a source string and merge its definitions.
    pub fn load_source(&mut self, source: &str) -> Result<(), SchemaError> {
        let file = Parser::parse(source)?;
        for message in file.messages {
            if let Some(package) = &file.package {
                self.qualified
                    .insert(format!("{package}.{}", message.name), message.name.clone());
            }
            match self.messages.get(&message.name) {
                // The same file loaded twice, or a shared definition included
                // by several schemas.
                Some(existing) if *existing == message => {}
                Some(_) => return Err(SchemaError::DuplicateType(message.name)),
                None => {
                    self.messages.insert(message.name.clone(), message);
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get_message(&self, name: &str) -> Option<&MessageDef> {
        self.messages.get(self.resolve_name(name)?)
    }

    #[must_use]
    pub fn message_names(&self) -> Vec<&str> {
        self.messages.keys().map(String::as_str).collect()
    }

    /// Map a possibly qualified reference to a short message name.
    fn resolve_name<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.messages.contains_key(name) {
            return Some(name);
        }
        if let Some(short) = self.qualified.get(name) {
            return Some(short.as_str());
        }
        let last = name.rsplit('.').next()?;
        self.messages.contains_key(last).then_some(last)
    }

    /// Lay out every message and collect the descriptors.
    pub fn compile(&self) -> Result<DescriptorSet, SchemaError> {
        let mut done = HashMap::new();
        for message in self.messages.values() {
            self.compile_message(message, &mut done, &mut Vec::new())?;
        }
        Ok(done.into_values().collect())
    }

    fn compile_message(
        &self,
        message: &MessageDef,
        done: &mut HashMap<String, Arc<RecordDescriptor>>,
        visiting: &mut Vec<String>,
    ) -> Result<Arc<RecordDescriptor>, SchemaError> {
        let name = message.name.as_str();
        if let Some(desc) = done.get(name) {
            return Ok(Arc::clone(desc));
        }
        if visiting.iter().any(|n| n == name) {
            let mut chain = visiting.clone();
            chain.push(name.to_string());
            return Err(SchemaError::CyclicMessage(chain.join(" -> ")));
        }

        visiting.push(name.to_string());
        let mut layout = RecordLayout::new(&message.name);
        for field in &message.fields {
            let kind = match &field.ty {
                TypeRef::Scalar(scalar) => {
                    scalar_kind(scalar).ok_or_else(|| SchemaError::UnknownType {
                        message: message.name.clone(),
                        field: field.name.clone(),
                        ty: scalar.clone(),
                    })?
                }
                TypeRef::Named(ty) => {
                    let target = self.get_message(ty).ok_or_else(|| SchemaError::UnknownType {
                        message: message.name.clone(),
                        field: field.name.clone(),
                        ty: ty.clone(),
                    })?;
                    FieldKind::Message(self.compile_message(target, done, visiting)?)
                }
            };
            let label = match field.label {
                FieldLabel::Required => Label::Required,
                FieldLabel::Optional => Label::Optional,
            };
            layout = layout.field(&field.name, kind, label);
        }
        visiting.pop();

        let desc = layout.build()?;
        debug!(
            message = %desc.name,
            size = desc.fixed_size,
            fields = desc.fields.len(),
            "compiled message"
        );
        done.insert(name.to_string(), Arc::clone(&desc));
        Ok(desc)
    }
}

fn scalar_kind(name: &str) -> Option<FieldKind> {
    let wire = match name {
        "int32" => return Some(FieldKind::Int32),
        "uint32" => return Some(FieldKind::UInt32),
        "float" => return Some(FieldKind::Float32),
        "string" => return Some(FieldKind::String),
        "double" => WireType::Double,
        "int64" => WireType::Int64,
        "uint64" => WireType::UInt64,
        "fixed64" => WireType::Fixed64,
        "fixed32" => WireType::Fixed32,
        "bool" => WireType::Bool,
        "bytes" => WireType::Bytes,
        "sfixed32" => WireType::SFixed32,
        "sfixed64" => WireType::SFixed64,
        "sint32" => WireType::SInt32,
        "sint64" => WireType::SInt64,
        _ => return None,
    };
    Some(FieldKind::Unsupported(wire))
}

/// Render compiled descriptors as JSON, one entry per message with its
/// packed size and field offsets.
pub fn describe(set: &DescriptorSet) -> serde_json::Value {
    let messages: Vec<_> = set
        .iter()
        .map(|desc| {
            let fields: Vec<_> = desc
                .fields
                .iter()
                .map(|f| {
                    json!({
                        "name": f.name,
                        "type": f.kind.to_string(),
                        "offset": f.offset,
                        "required": f.is_required(),
                    })
                })
                .collect();
            json!({
                "name": desc.name,
                "id": desc.message_id().to_string(),
                "size": desc.fixed_size,
                "fields": fields,
            })
        })
        .collect();
    json!({ "messages": messages })
}
