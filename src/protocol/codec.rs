//! Envelope codec
//!
//! ```text
//! +-----------+---------------------------------------------------------+
//! | type u32  | body                                                    |
//! +-----------+---------------------------------------------------------+
//!  1 control    UTF-8 JSON document
//!  2 video      ts u64 | id_len u32 | id | width u32 | height u32 | I420
//!  3 audio      ts u64 | stream u32 | f32 samples
//! ```
//!
//! All integers and samples are little-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::control::ControlMessage;
use crate::error::{DecodeError, Result};
use crate::media::{AudioChunk, VideoFrame};

/// Envelope discriminators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    Control = 1,
    Video = 2,
    Audio = 3,
}

impl TryFrom<u32> for MessageType {
    type Error = DecodeError;

    fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(MessageType::Control),
            2 => Ok(MessageType::Video),
            3 => Ok(MessageType::Audio),
            other => Err(DecodeError::UnknownMessageType(other)),
        }
    }
}

/// A decoded envelope
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Control(serde_json::Value),
    Video(VideoFrame),
    Audio(AudioChunk),
}

impl Message {
    /// Envelope discriminator of this message
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Control(_) => MessageType::Control,
            Message::Video(_) => MessageType::Video,
            Message::Audio(_) => MessageType::Audio,
        }
    }
}

const TYPE_SIZE: usize = 4;
const VIDEO_FIXED_SIZE: usize = 8 + 4 + 4 + 4;
const AUDIO_FIXED_SIZE: usize = 8 + 4;

/// Encode a control document as a type 1 envelope
pub fn encode_control(message: &ControlMessage) -> Result<Bytes> {
    let body = serde_json::to_vec(message)?;
    let mut buf = BytesMut::with_capacity(TYPE_SIZE + body.len());
    buf.put_u32_le(MessageType::Control as u32);
    buf.extend_from_slice(&body);
    Ok(buf.freeze())
}

/// Encode a video frame as a type 2 envelope
pub fn encode_video(frame: &VideoFrame) -> Bytes {
    let stream_id = frame.stream_id.as_bytes();
    let mut buf = BytesMut::with_capacity(TYPE_SIZE + VIDEO_FIXED_SIZE + stream_id.len() + frame.data.len());

    buf.put_u32_le(MessageType::Video as u32);
    buf.put_u64_le(frame.timestamp_us);
    buf.put_u32_le(stream_id.len() as u32);
    buf.extend_from_slice(stream_id);
    buf.put_u32_le(frame.width);
    buf.put_u32_le(frame.height);
    buf.extend_from_slice(&frame.data);

    buf.freeze()
}

/// Encode an audio chunk as a type 3 envelope
pub fn encode_audio(chunk: &AudioChunk) -> Bytes {
    let mut buf = BytesMut::with_capacity(TYPE_SIZE + AUDIO_FIXED_SIZE + chunk.samples.len() * 4);

    buf.put_u32_le(MessageType::Audio as u32);
    buf.put_u64_le(chunk.timestamp_us);
    buf.put_u32_le(chunk.stream_id);
    for sample in &chunk.samples {
        buf.put_f32_le(*sample);
    }

    buf.freeze()
}

/// Decode one whole envelope
pub fn decode(data: &mut Bytes) -> std::result::Result<Message, DecodeError> {
    if data.remaining() < TYPE_SIZE {
        return Err(DecodeError::UnexpectedEof);
    }

    match MessageType::try_from(data.get_u32_le())? {
        MessageType::Control => decode_control(data),
        MessageType::Video => decode_video(data),
        MessageType::Audio => decode_audio(data),
    }
}

fn decode_control(data: &mut Bytes) -> std::result::Result<Message, DecodeError> {
    let body = data.split_to(data.len());
    let value = serde_json::from_slice(&body).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    Ok(Message::Control(value))
}

fn decode_video(data: &mut Bytes) -> std::result::Result<Message, DecodeError> {
    if data.remaining() < 8 + 4 {
        return Err(DecodeError::UnexpectedEof);
    }
    let timestamp_us = data.get_u64_le();
    let id_len = data.get_u32_le() as usize;

    if data.remaining() < id_len {
        return Err(DecodeError::LengthOutOfBounds {
            declared: id_len,
            remaining: data.remaining(),
        });
    }
    let id_bytes = data.split_to(id_len);
    let stream_id = std::str::from_utf8(&id_bytes)
        .map_err(|_| DecodeError::InvalidUtf8)?
        .to_string();

    if data.remaining() < 4 + 4 {
        return Err(DecodeError::UnexpectedEof);
    }
    let width = data.get_u32_le();
    let height = data.get_u32_le();
    let pixels = data.split_to(data.len());

    Ok(Message::Video(VideoFrame {
        timestamp_us,
        stream_id,
        width,
        height,
        data: pixels,
    }))
}

fn decode_audio(data: &mut Bytes) -> std::result::Result<Message, DecodeError> {
    if data.remaining() < AUDIO_FIXED_SIZE {
        return Err(DecodeError::UnexpectedEof);
    }
    let timestamp_us = data.get_u64_le();
    let stream_id = data.get_u32_le();

    if data.remaining() % 4 != 0 {
        return Err(DecodeError::MisalignedSamples(data.remaining()));
    }
    let mut samples = Vec::with_capacity(data.remaining() / 4);
    while data.has_remaining() {
        samples.push(data.get_f32_le());
    }

    Ok(Message::Audio(AudioChunk {
        timestamp_us,
        stream_id,
        samples,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::FILLER_STREAM_ID;
    use crate::room::Caption;

    #[test]
    fn test_video_envelope_exact_length() {
        let pixels = VideoFrame::i420_len(4, 2);
        let frame = VideoFrame {
            timestamp_us: 1_000,
            stream_id: "42".into(),
            width: 4,
            height: 2,
            data: Bytes::from(vec![1u8; pixels]),
        };

        let encoded = encode_video(&frame);
        assert_eq!(encoded.len(), 4 + 8 + 4 + "42".len() + 4 + 4 + pixels);
        assert_eq!(&encoded[..4], &2u32.to_le_bytes());
        assert_eq!(&encoded[4..12], &1_000u64.to_le_bytes());
        assert_eq!(&encoded[12..16], &2u32.to_le_bytes());
        assert_eq!(&encoded[16..18], b"42");

        let decoded = decode(&mut encoded.clone()).unwrap();
        assert_eq!(decoded, Message::Video(frame));
    }

    #[test]
    fn test_placeholder_envelope() {
        let frame = VideoFrame::black(1920, 1080).as_filler(7);
        let encoded = encode_video(&frame);
        assert_eq!(encoded.len(), 4 + 8 + 4 + 1 + 4 + 4 + 1920 * 1080 * 3 / 2);
        assert_eq!(&encoded[16..17], FILLER_STREAM_ID.as_bytes());
    }

    #[test]
    fn test_audio_envelope() {
        let chunk = AudioChunk {
            timestamp_us: 99,
            stream_id: 3,
            samples: vec![0.25, -1.0],
        };
        let encoded = encode_audio(&chunk);
        assert_eq!(encoded.len(), 4 + 8 + 4 + 2 * 4);
        assert_eq!(&encoded[16..20], &0.25f32.to_le_bytes());

        assert_eq!(decode(&mut encoded.clone()).unwrap(), Message::Audio(chunk));
    }

    #[test]
    fn test_audio_misaligned_payload() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(3);
        buf.put_u64_le(0);
        buf.put_u32_le(1);
        buf.put_slice(&[0, 0, 0]);
        let result = decode(&mut buf.freeze());
        assert_eq!(result, Err(DecodeError::MisalignedSamples(3)));
    }

    #[test]
    fn test_control_envelope() {
        let message = ControlMessage::CaptionUpdate {
            caption: Caption {
                caption_id: 1,
                device_id: "a".into(),
                version: 1,
                text: "hey".into(),
                language_id: 1,
            },
        };
        let encoded = encode_control(&message).unwrap();
        assert_eq!(&encoded[..4], &1u32.to_le_bytes());

        let Message::Control(value) = decode(&mut encoded.clone()).unwrap() else {
            panic!("expected control message");
        };
        assert_eq!(value["type"], "CaptionUpdate");
        assert_eq!(value["caption"]["text"], "hey");
    }

    #[test]
    fn test_unknown_type() {
        let mut data = Bytes::from_static(&[9, 0, 0, 0, 1, 2]);
        assert_eq!(decode(&mut data), Err(DecodeError::UnknownMessageType(9)));
    }

    #[test]
    fn test_truncated_inputs() {
        assert_eq!(decode(&mut Bytes::from_static(&[2, 0])), Err(DecodeError::UnexpectedEof));

        // stream id length runs past the end
        let mut buf = BytesMut::new();
        buf.put_u32_le(2);
        buf.put_u64_le(0);
        buf.put_u32_le(10);
        buf.put_slice(b"abc");
        assert_eq!(
            decode(&mut buf.freeze()),
            Err(DecodeError::LengthOutOfBounds {
                declared: 10,
                remaining: 3
            })
        );
    }

    #[test]
    fn test_invalid_json() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(1);
        buf.put_slice(b"{not json");
        assert!(matches!(decode(&mut buf.freeze()), Err(DecodeError::InvalidJson(_))));
    }
}
