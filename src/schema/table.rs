//! Static schema tables and the registry that validates them

use std::collections::{HashMap, HashSet};

use bytes::Bytes;

use super::decoder::MessageDecoder;
use super::meeting;
use super::value::Record;
use super::wire::WireType;
use crate::error::{ConfigurationError, Result};

/// How a field is encoded on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Length-prefixed UTF-8
    String,
    /// Two's-complement varint
    Int64,
    /// Varint truncated to 32 bits
    Varint,
    /// Length-prefixed nested message of the named schema
    Message(&'static str),
}

impl FieldKind {
    /// Wire type this kind must be encoded with
    pub const fn wire_type(self) -> WireType {
        match self {
            FieldKind::String | FieldKind::Message(_) => WireType::LengthDelimited,
            FieldKind::Int64 | FieldKind::Varint => WireType::Varint,
        }
    }
}

/// One entry of a message's field table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub tag: u32,
    pub kind: FieldKind,
    pub repeated: bool,
}

impl FieldSchema {
    /// Singular field of any kind
    pub const fn new(name: &'static str, tag: u32, kind: FieldKind) -> Self {
        Self {
            name,
            tag,
            kind,
            repeated: false,
        }
    }

    /// Singular string field
    pub const fn string(name: &'static str, tag: u32) -> Self {
        Self::new(name, tag, FieldKind::String)
    }

    /// Singular signed 64-bit field
    pub const fn int64(name: &'static str, tag: u32) -> Self {
        Self::new(name, tag, FieldKind::Int64)
    }

    /// Singular 32-bit varint field
    pub const fn varint(name: &'static str, tag: u32) -> Self {
        Self::new(name, tag, FieldKind::Varint)
    }

    /// Singular nested message field
    pub const fn message(name: &'static str, tag: u32, schema: &'static str) -> Self {
        Self::new(name, tag, FieldKind::Message(schema))
    }

    /// Mark the field as repeated
    pub const fn repeated(self) -> Self {
        Self {
            repeated: true,
            ..self
        }
    }
}

/// A named message schema
#[derive(Debug)]
pub struct MessageSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSchema],
}

impl MessageSchema {
    /// Look up a field by its wire tag
    pub fn field(&self, tag: u32) -> Option<&'static FieldSchema> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// Look up a field by name
    pub fn field_named(&self, name: &str) -> Option<&'static FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Validated set of schemas, looked up by name
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, &'static MessageSchema>,
}

impl SchemaRegistry {
    /// Build a registry, rejecting duplicate names, duplicate tags, and
    /// references to schemas that are not in the table
    pub fn new(table: &'static [MessageSchema]) -> std::result::Result<Self, ConfigurationError> {
        let mut schemas = HashMap::with_capacity(table.len());
        for schema in table {
            if schemas.insert(schema.name, schema).is_some() {
                return Err(ConfigurationError::DuplicateSchema(schema.name));
            }
        }

        for schema in table {
            let mut tags = HashSet::with_capacity(schema.fields.len());
            for field in schema.fields {
                if !tags.insert(field.tag) {
                    return Err(ConfigurationError::DuplicateTag {
                        schema: schema.name,
                        tag: field.tag,
                    });
                }
                if let FieldKind::Message(target) = field.kind {
                    if !schemas.contains_key(target) {
                        return Err(ConfigurationError::MissingSubSchema {
                            schema: schema.name,
                            field: field.name,
                            target,
                        });
                    }
                }
            }
        }

        Ok(Self { schemas })
    }

    /// Registry of the meeting service's record formats
    pub fn meeting() -> std::result::Result<Self, ConfigurationError> {
        Self::new(meeting::SCHEMAS)
    }

    /// Resolve a schema by name
    pub fn schema(&self, name: &str) -> std::result::Result<&'static MessageSchema, ConfigurationError> {
        self.schemas
            .get(name)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownSchema(name.to_string()))
    }

    /// Number of registered schemas
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Decode `length` bytes (or the rest of `buf`) as the named schema
    pub fn decode(&self, schema_name: &str, buf: &mut Bytes, length: Option<usize>) -> Result<Record> {
        MessageDecoder::new(self).decode(schema_name, buf, length)
    }

    /// Decode a whole slice as the named schema
    pub fn decode_slice(&self, schema_name: &str, data: &[u8]) -> Result<Record> {
        let mut buf = Bytes::copy_from_slice(data);
        self.decode(schema_name, &mut buf, None)
    }
}
