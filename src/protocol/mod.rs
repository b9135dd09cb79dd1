//! Outbound wire protocol
//!
//! One ordered byte channel carries three kinds of messages, each framed as
//! a 4-byte little-endian type followed by its body.

pub mod codec;
pub mod control;

pub use codec::{decode, encode_audio, encode_control, encode_video, Message, MessageType};
pub use control::ControlMessage;
