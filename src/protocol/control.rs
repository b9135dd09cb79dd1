//! Control documents
//!
//! JSON bodies of type-1 envelopes, tagged by a `type` field.

use serde::Serialize;

use crate::media::AudioFormat;
use crate::room::{Caption, DeviceOutput, ParticipantDiff};

/// JSON control documents sent to the consumer, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// `{"type":"UsersUpdate","newUsers":[..],"removedUsers":[..],"updatedUsers":[..]}`
    UsersUpdate(ParticipantDiff),

    DeviceOutputsUpdate {
        #[serde(rename = "deviceOutputs")]
        device_outputs: Vec<DeviceOutput>,
    },

    CaptionUpdate { caption: Caption },

    AudioFormatUpdate { format: AudioFormat },
}

impl ControlMessage {
    /// Value of the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            ControlMessage::UsersUpdate(_) => "UsersUpdate",
            ControlMessage::DeviceOutputsUpdate { .. } => "DeviceOutputsUpdate",
            ControlMessage::CaptionUpdate { .. } => "CaptionUpdate",
            ControlMessage::AudioFormatUpdate { .. } => "AudioFormatUpdate",
        }
    }
}
