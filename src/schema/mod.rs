//! Schema-driven record decoding
//!
//! Room snapshots and datachannel events are protobuf-encoded by a service
//! we have no `.proto` files for. Instead of hand-written parsers, each message
//! is described by a static field table and decoded by one generic walker.
//!
//! ```text
//!   &'static [MessageSchema] ──► SchemaRegistry::new (validate once)
//!                                      │
//!   Bytes ──► MessageDecoder::decode(name, buf, len) ──► Record
//!                                      ▲
//!   Record ──► RecordEncoder::encode(name, record) ──► Bytes
//! ```

pub mod decoder;
pub mod encoder;
pub mod meeting;
pub mod table;
pub mod value;
pub mod wire;

pub use decoder::MessageDecoder;
pub use encoder::RecordEncoder;
pub use table::{FieldKind, FieldSchema, MessageSchema, SchemaRegistry};
pub use value::{Record, Value};
pub use wire::WireWriter;
