//! Record encoder
//!
//! The inverse of [`super::MessageDecoder`]: writes a [`Record`] using the
//! same schema tables. Fields are emitted in table order; repeated fields keep
//! their list order.

use bytes::Bytes;

use super::table::{FieldKind, FieldSchema, MessageSchema, SchemaRegistry};
use super::value::{Record, Value};
use super::wire::WireWriter;
use crate::error::{ConfigurationError, Result};

/// Encoder bound to a registry
pub struct RecordEncoder<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> RecordEncoder<'a> {
    /// Create an encoder over a registry
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Encode a record as the named schema
    pub fn encode(&self, schema_name: &str, record: &Record) -> Result<Bytes> {
        let schema = self.registry.schema(schema_name)?;
        let mut writer = WireWriter::new();
        self.encode_message(schema, record, &mut writer)?;
        Ok(writer.finish())
    }

    fn encode_message(&self, schema: &MessageSchema, record: &Record, writer: &mut WireWriter) -> Result<()> {
        for field in schema.fields {
            let Some(value) = record.get(field.name) else {
                continue;
            };

            match (field.repeated, value) {
                (true, Value::List(items)) => {
                    for item in items {
                        self.encode_value(field, item, writer)?;
                    }
                }
                (true, single) => self.encode_value(field, single, writer)?,
                (false, value) => self.encode_value(field, value, writer)?,
            }
        }
        Ok(())
    }

    fn encode_value(&self, field: &FieldSchema, value: &Value, writer: &mut WireWriter) -> Result<()> {
        match (field.kind, value) {
            (FieldKind::String, Value::Str(s)) => {
                writer.string(field.tag, s);
            }
            (FieldKind::Int64, Value::Int(i)) => {
                writer.int64(field.tag, *i);
            }
            (FieldKind::Varint, Value::UInt(u)) => {
                writer.varint(field.tag, u64::from(*u));
            }
            (FieldKind::Message(target), Value::Message(inner)) => {
                let sub_schema = self.registry.schema(target)?;
                let mut nested = WireWriter::new();
                self.encode_message(sub_schema, inner, &mut nested)?;
                writer.bytes(field.tag, &nested.finish());
            }
            _ => {
                return Err(ConfigurationError::ValueKindMismatch { field: field.name }.into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::schema::meeting;

    fn participant(device_id: &str, name: &str, status: u32) -> Record {
        Record::new()
            .with("deviceId", device_id)
            .with("fullName", name)
            .with("displayName", name)
            .with("status", status)
    }

    #[test]
    fn test_roundtrip_preserves_repeated_order() {
        let registry = SchemaRegistry::meeting().unwrap();
        let users = vec![
            participant("dev-3", "Carol", 1),
            participant("dev-1", "Alice", 6),
            participant("dev-2", "Bob", 7),
        ];
        let wrapper = Record::new().with("userInfoList", users.clone());
        let response = Record::new().with(
            "userInfoListWrapperWrapper",
            Record::new().with("userInfoListWrapper", wrapper),
        );

        let encoded = RecordEncoder::new(&registry)
            .encode(meeting::USER_INFO_LIST_RESPONSE, &response)
            .unwrap();
        let decoded = registry
            .decode_slice(meeting::USER_INFO_LIST_RESPONSE, &encoded)
            .unwrap();

        assert_eq!(decoded, response);
        let list = decoded
            .path(&["userInfoListWrapperWrapper", "userInfoListWrapper"])
            .unwrap()
            .get_list("userInfoList");
        let ids: Vec<_> = list
            .iter()
            .filter_map(Value::as_message)
            .filter_map(|r| r.get_str("deviceId"))
            .collect();
        assert_eq!(ids, vec!["dev-3", "dev-1", "dev-2"]);
    }

    #[test]
    fn test_roundtrip_caption_with_negative_int() {
        let registry = SchemaRegistry::meeting().unwrap();
        let caption = Record::new()
            .with("deviceId", "dev-1")
            .with("captionId", 12i64)
            .with("version", 3i64)
            .with("text", "hello there")
            .with("languageId", -1i64);
        let wrapper = Record::new().with("caption", caption);

        let encoded = RecordEncoder::new(&registry)
            .encode(meeting::CAPTION_WRAPPER, &wrapper)
            .unwrap();
        let decoded = registry.decode_slice(meeting::CAPTION_WRAPPER, &encoded).unwrap();
        assert_eq!(decoded, wrapper);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let registry = SchemaRegistry::meeting().unwrap();
        let bad = Record::new().with("deviceId", 5u32);
        let result = RecordEncoder::new(&registry).encode(meeting::USER_INFO_LIST, &bad);
        assert!(matches!(
            result,
            Err(Error::Configuration(ConfigurationError::ValueKindMismatch {
                field: "deviceId"
            }))
        ));
    }
}
