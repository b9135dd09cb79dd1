//! Decoded record values
//!
//! The decoder produces a [`Record`] per message: a map from the schema's
//! field names to [`Value`]s. Nested messages are records themselves and
//! repeated fields are lists in encounter order.

use std::collections::HashMap;

/// A single decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Length-prefixed UTF-8 string
    Str(String),

    /// Signed 64-bit varint
    Int(i64),

    /// Unsigned 32-bit varint
    UInt(u32),

    /// Nested message
    Message(Record),

    /// Repeated field, in wire order
    List(Vec<Value>),
}

impl Value {
    /// Try to get this value as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a signed integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => Some(i64::from(*u)),
            _ => None,
        }
    }

    /// Try to get this value as an unsigned 32-bit integer
    pub fn as_uint(&self) -> Option<u32> {
        match self {
            Value::UInt(u) => Some(*u),
            _ => None,
        }
    }

    /// Try to get this value as a nested record
    pub fn as_message(&self) -> Option<&Record> {
        match self {
            Value::Message(r) => Some(r),
            _ => None,
        }
    }

    /// Try to get this value as a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Message(v)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(v: Vec<V>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

/// A decoded message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<&'static str, Value>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used for fixtures
    pub fn with(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.fields.insert(name, value.into());
        self
    }

    /// Set a field, replacing any previous value
    pub fn set(&mut self, name: &'static str, value: Value) {
        self.fields.insert(name, value);
    }

    /// Append to a repeated field
    pub fn push(&mut self, name: &'static str, value: Value) {
        match self.fields.get_mut(name) {
            Some(Value::List(items)) => items.push(value),
            _ => {
                self.fields.insert(name, Value::List(vec![value]));
            }
        }
    }

    /// Get a field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a string field
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    /// Get an integer field
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_int()
    }

    /// Get an unsigned varint field
    pub fn get_uint(&self, name: &str) -> Option<u32> {
        self.get(name)?.as_uint()
    }

    /// Get a nested record
    pub fn get_message(&self, name: &str) -> Option<&Record> {
        self.get(name)?.as_message()
    }

    /// Get a repeated field; absent fields read as empty
    pub fn get_list(&self, name: &str) -> &[Value] {
        self.get(name).and_then(Value::as_list).unwrap_or(&[])
    }

    /// Follow a chain of nested message fields
    pub fn path(&self, names: &[&str]) -> Option<&Record> {
        names
            .iter()
            .try_fold(self, |record, name| record.get_message(name))
    }

    /// Number of populated fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no field was populated
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
