//! Error types
//!
//! Every fallible operation in the crate returns [`Error`] or one of the
//! narrower decode/configuration errors it wraps.

/// Malformed or truncated binary input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Buffer ended before the value was complete
    #[error("Unexpected end of buffer")]
    UnexpectedEof,

    /// Protobuf framing rejected by the wire layer (bad varint, key or group)
    #[error("Malformed protobuf: {0}")]
    Protobuf(String),

    /// Length prefix points past the end of the enclosing buffer
    #[error("Length prefix {declared} exceeds remaining {remaining} bytes")]
    LengthOutOfBounds { declared: usize, remaining: usize },

    /// String field is not valid UTF-8
    #[error("Invalid UTF-8 in string field")]
    InvalidUtf8,

    /// Known field encoded with a different wire type than its schema kind
    #[error("Field {field} expects wire type {expected}, found {actual}")]
    WireTypeMismatch {
        field: &'static str,
        expected: u8,
        actual: u8,
    },

    /// Nested messages deeper than the decoder allows
    #[error("Nesting too deep")]
    NestingTooDeep,

    /// Envelope discriminator not known to this protocol
    #[error("Unknown message type: {0}")]
    UnknownMessageType(u32),

    /// Audio payload is not a whole number of f32 samples
    #[error("Audio payload of {0} bytes is not a whole number of samples")]
    MisalignedSamples(usize),

    /// Control body is not a JSON document
    #[error("Invalid control document: {0}")]
    InvalidJson(String),

    /// Compressed datachannel payload could not be inflated
    #[error("Invalid compressed body: {0}")]
    InvalidCompression(String),

    /// Base64 text could not be decoded
    #[error("Invalid base64 body: {0}")]
    InvalidBase64(String),
}

/// Schema table or schema reference problems
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// No schema registered under this name
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    /// Two schemas share a name
    #[error("Duplicate schema: {0}")]
    DuplicateSchema(&'static str),

    /// Two fields of one schema share a tag
    #[error("Duplicate tag {tag} in schema {schema}")]
    DuplicateTag { schema: &'static str, tag: u32 },

    /// A nested field names a schema that is not registered
    #[error("Field {schema}.{field} references unknown schema {target}")]
    MissingSubSchema {
        schema: &'static str,
        field: &'static str,
        target: &'static str,
    },

    /// A record value does not match the kind its schema declares
    #[error("Value for field {field} does not match its schema kind")]
    ValueKindMismatch { field: &'static str },
}

/// Top-level error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Outbound channel is not open; the message was dropped
    #[error("Outbound channel unavailable: {0}")]
    ChannelUnavailable(&'static str),

    /// A record the handler expected is absent from otherwise valid input
    #[error("Upstream inconsistency: {0}")]
    UpstreamInconsistency(String),

    /// Control document could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
