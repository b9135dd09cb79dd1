//! Media handling
//!
//! This module provides:
//! - Raw frame and audio chunk types, and the black placeholder frame
//! - Video source selection
//! - Frame throttling and filler frames
//! - Audio mono down-mix and format tracking

pub mod audio;
pub mod frame;
pub mod relay;
pub mod track;

pub use audio::{AudioFormat, AudioRelay, RelayedAudio};
pub use frame::{AudioChunk, RawAudio, VideoFrame, FILLER_STREAM_ID};
pub use relay::{FrameRelay, RelayState};
pub use track::{TrackSelector, VideoSource};
