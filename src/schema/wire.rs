//! Length-delimited wire primitives
//!
//! Records arrive in the protobuf wire format. Every field starts with a
//! varint key `(field_number << 3) | wire_type`:
//!
//! ```text
//! 0 - Varint (LEB128, up to 10 bytes)
//! 1 - Fixed64 (8 bytes, little endian)
//! 2 - Length-delimited (varint length + bytes)
//! 3 - Start group (deprecated)
//! 4 - End group (deprecated)
//! 5 - Fixed32 (4 bytes, little endian)
//! ```
//!
//! Key and varint handling comes from `prost::encoding`; this module adds
//! the bounds-checked split of length-delimited payloads the schema walker
//! needs and a field writer for building records.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use prost::encoding::{self, DecodeContext};

pub use prost::encoding::WireType;

use crate::error::DecodeError;

impl From<prost::DecodeError> for DecodeError {
    fn from(err: prost::DecodeError) -> Self {
        DecodeError::Protobuf(err.to_string())
    }
}

/// Read a LEB128 varint
pub fn read_varint(buf: &mut Bytes) -> Result<u64, DecodeError> {
    if !buf.has_remaining() {
        return Err(DecodeError::UnexpectedEof);
    }
    Ok(encoding::decode_varint(buf)?)
}

/// Read a field key, returning `(field_number, wire_type)`
pub fn read_tag(buf: &mut Bytes) -> Result<(u32, WireType), DecodeError> {
    if !buf.has_remaining() {
        return Err(DecodeError::UnexpectedEof);
    }
    Ok(encoding::decode_key(buf)?)
}

/// Read a varint length prefix and split off that many bytes
pub fn read_length_delimited(buf: &mut Bytes) -> Result<Bytes, DecodeError> {
    let declared = read_varint(buf)?;
    let remaining = buf.remaining();
    let len = usize::try_from(declared).map_err(|_| DecodeError::LengthOutOfBounds {
        declared: usize::MAX,
        remaining,
    })?;
    if len > remaining {
        return Err(DecodeError::LengthOutOfBounds {
            declared: len,
            remaining,
        });
    }
    Ok(buf.split_to(len))
}

/// Skip the value of a field that the schema does not know about
///
/// Groups are skipped recursively up to prost's recursion limit.
pub fn skip_field(buf: &mut Bytes, field_number: u32, wire_type: WireType) -> Result<(), DecodeError> {
    Ok(encoding::skip_field(
        wire_type,
        field_number,
        buf,
        DecodeContext::default(),
    )?)
}

/// Field-level writer for the same wire format
///
/// Used by [`super::RecordEncoder`] and handy for building raw fixtures that
/// contain fields a schema does not declare.
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(128),
        }
    }

    /// Get the encoded bytes and reset the writer
    pub fn finish(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    /// Current encoded length
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write a varint field
    pub fn varint(&mut self, field_number: u32, value: u64) -> &mut Self {
        encoding::encode_key(field_number, WireType::Varint, &mut self.buf);
        encoding::encode_varint(value, &mut self.buf);
        self
    }

    /// Write a signed 64-bit field (two's complement varint)
    pub fn int64(&mut self, field_number: u32, value: i64) -> &mut Self {
        self.varint(field_number, value as u64)
    }

    /// Write a string field
    pub fn string(&mut self, field_number: u32, value: &str) -> &mut Self {
        self.bytes(field_number, value.as_bytes())
    }

    /// Write a length-delimited field (nested message or raw bytes)
    pub fn bytes(&mut self, field_number: u32, value: &[u8]) -> &mut Self {
        encoding::encode_key(field_number, WireType::LengthDelimited, &mut self.buf);
        encoding::encode_varint(value.len() as u64, &mut self.buf);
        self.buf.put_slice(value);
        self
    }

    /// Write a fixed 32-bit field
    pub fn fixed32(&mut self, field_number: u32, value: u32) -> &mut Self {
        encoding::encode_key(field_number, WireType::ThirtyTwoBit, &mut self.buf);
        self.buf.put_u32_le(value);
        self
    }

    /// Write a fixed 64-bit field
    pub fn fixed64(&mut self, field_number: u32, value: u64) -> &mut Self {
        encoding::encode_key(field_number, WireType::SixtyFourBit, &mut self.buf);
        self.buf.put_u64_le(value);
        self
    }
}

impl Default for WireWriter {
    fn default() -> Self {
        Self::new()
    }
}
