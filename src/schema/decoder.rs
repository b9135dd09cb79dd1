//! Generic schema-driven decoder
//!
//! Walks a tagged, length-delimited buffer and fills a [`Record`] from the
//! schema's field table. Fields the schema does not declare are skipped by
//! their wire type, so newer senders never break older tables.

use bytes::{Buf, Bytes};

use super::table::{FieldKind, FieldSchema, MessageSchema, SchemaRegistry};
use super::value::{Record, Value};
use super::wire::{read_length_delimited, read_tag, read_varint, skip_field};
use crate::error::{DecodeError, Result};

/// Maximum nesting depth for messages (prevent stack overflow)
const MAX_NESTING_DEPTH: usize = 64;

/// Decoder bound to a registry
pub struct MessageDecoder<'a> {
    registry: &'a SchemaRegistry,
    depth: usize,
}

impl<'a> MessageDecoder<'a> {
    /// Create a decoder at nesting depth zero
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry, depth: 0 }
    }

    /// Decode a message of the named schema
    ///
    /// Reads `length` bytes from `buf` when given, otherwise everything that
    /// remains. The schema name is resolved before any byte is consumed.
    pub fn decode(&mut self, schema_name: &str, buf: &mut Bytes, length: Option<usize>) -> Result<Record> {
        let schema = self.registry.schema(schema_name)?;

        let mut body = match length {
            Some(len) if len > buf.remaining() => {
                return Err(DecodeError::LengthOutOfBounds {
                    declared: len,
                    remaining: buf.remaining(),
                }
                .into());
            }
            Some(len) => buf.split_to(len),
            None => buf.split_to(buf.remaining()),
        };

        self.decode_message(schema, &mut body)
    }

    fn decode_message(&mut self, schema: &MessageSchema, buf: &mut Bytes) -> Result<Record> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.depth -= 1;
            return Err(DecodeError::NestingTooDeep.into());
        }

        let result = self.decode_fields(schema, buf);
        self.depth -= 1;
        result
    }

    fn decode_fields(&mut self, schema: &MessageSchema, buf: &mut Bytes) -> Result<Record> {
        let mut record = Record::new();

        while buf.has_remaining() {
            let (field_number, wire_type) = read_tag(buf)?;

            let Some(field) = schema.field(field_number) else {
                skip_field(buf, field_number, wire_type)?;
                continue;
            };

            let expected = field.kind.wire_type();
            if wire_type != expected {
                return Err(DecodeError::WireTypeMismatch {
                    field: field.name,
                    expected: expected as u8,
                    actual: wire_type as u8,
                }
                .into());
            }

            let value = self.decode_value(field, buf)?;
            if field.repeated {
                record.push(field.name, value);
            } else {
                record.set(field.name, value);
            }
        }

        Ok(record)
    }

    fn decode_value(&mut self, field: &FieldSchema, buf: &mut Bytes) -> Result<Value> {
        let value = match field.kind {
            FieldKind::String => {
                let raw = read_length_delimited(buf)?;
                let s = String::from_utf8(raw.to_vec()).map_err(|_| DecodeError::InvalidUtf8)?;
                Value::Str(s)
            }
            FieldKind::Int64 => Value::Int(read_varint(buf)? as i64),
            FieldKind::Varint => Value::UInt(read_varint(buf)? as u32),
            FieldKind::Message(target) => {
                let sub_schema = self.registry.schema(target)?;
                let mut sub = read_length_delimited(buf)?;
                Value::Message(self.decode_message(sub_schema, &mut sub)?)
            }
        };
        Ok(value)
    }
}
