//! Audio relay
//!
//! Every audio track is forwarded (no selection). Planar input is mixed down
//! to mono, and each track gets a numeric stream id for the wire.

use std::collections::HashMap;

use serde::Serialize;

use super::frame::{AudioChunk, RawAudio, AUDIO_SAMPLE_FORMAT};

/// Shape of the audio a track is producing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFormat {
    /// Channels on the wire; always mono
    pub number_of_channels: u32,
    pub original_number_of_channels: u32,
    pub number_of_frames: u32,
    pub sample_rate: u32,
    pub format: &'static str,
}

impl AudioFormat {
    fn of(raw: &RawAudio) -> Self {
        Self {
            number_of_channels: 1,
            original_number_of_channels: raw.channels() as u32,
            number_of_frames: raw.frames() as u32,
            sample_rate: raw.sample_rate,
            format: AUDIO_SAMPLE_FORMAT,
        }
    }
}

/// Result of relaying one capture
#[derive(Debug, Clone, PartialEq)]
pub struct RelayedAudio {
    /// Present when the track's format differs from its previous capture
    pub format_update: Option<AudioFormat>,
    pub chunk: AudioChunk,
}

#[derive(Debug, Default)]
struct AudioTrack {
    stream_id: u32,
    format: Option<AudioFormat>,
}

/// Per-track audio stream ids and last announced formats
#[derive(Debug)]
pub struct AudioRelay {
    tracks: HashMap<String, AudioTrack>,
    next_stream_id: u32,
}

impl Default for AudioRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioRelay {
    /// Create a relay with no known tracks
    pub fn new() -> Self {
        Self {
            tracks: HashMap::new(),
            next_stream_id: 1,
        }
    }

    /// Stream id of a track, assigning the next one on first sight
    pub fn stream_id_for(&mut self, track_id: &str) -> u32 {
        if let Some(track) = self.tracks.get(track_id) {
            return track.stream_id;
        }

        let stream_id = self.next_stream_id;
        self.next_stream_id += 1;
        self.tracks.insert(
            track_id.to_string(),
            AudioTrack {
                stream_id,
                format: None,
            },
        );
        tracing::info!(track = %track_id, stream_id, "Audio track registered");
        stream_id
    }

    /// Downmix one chunk to mono, announcing the format first when it changes
    pub fn relay(&mut self, track_id: &str, raw: RawAudio, timestamp_us: u64) -> RelayedAudio {
        let stream_id = self.stream_id_for(track_id);
        let format = AudioFormat::of(&raw);

        let format_update = self.tracks.get_mut(track_id).and_then(|track| {
            if track.format.as_ref() == Some(&format) {
                return None;
            }
            tracing::debug!(
                track = %track_id,
                sample_rate = format.sample_rate,
                channels = format.original_number_of_channels,
                frames = format.number_of_frames,
                "Audio format changed"
            );
            track.format = Some(format.clone());
            Some(format)
        });

        RelayedAudio {
            format_update,
            chunk: AudioChunk {
                timestamp_us,
                stream_id,
                samples: downmix(&raw.planes),
            },
        }
    }

    /// Forget a track; its stream id is not reused
    pub fn remove(&mut self, track_id: &str) -> bool {
        self.tracks.remove(track_id).is_some()
    }

    /// Number of known audio tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if no audio track is known
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Average planar channels into one
pub fn downmix(planes: &[Vec<f32>]) -> Vec<f32> {
    match planes {
        [] => Vec::new(),
        [mono] => mono.clone(),
        [first, rest @ ..] => {
            let mut mixed = first.clone();
            for plane in rest {
                for (acc, sample) in mixed.iter_mut().zip(plane) {
                    *acc += sample;
                }
            }
            let channels = planes.len() as f32;
            mixed.iter_mut().for_each(|s| *s /= channels);
            mixed
        }
    }
}
