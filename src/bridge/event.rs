//! Inbound events from the capture layer

use bytes::Bytes;

use crate::media::RawAudio;

/// Everything the bridge reacts to, in arrival order
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// The consumer connection is ready for writes
    ChannelOpened,
    /// The consumer connection went away
    ChannelClosed,
    /// Start forwarding media, captions, and filler frames
    EnableMedia,
    /// Stop forwarding media; room state keeps updating
    DisableMedia,

    /// A video track appeared; `stream_id` is the first stream it belongs to
    VideoTrackStarted {
        track_id: String,
        stream_id: Option<String>,
    },
    VideoTrackEnded {
        track_id: String,
    },
    /// One captured I420 frame
    VideoFrame {
        track_id: String,
        width: u32,
        height: u32,
        data: Bytes,
    },

    AudioTrackEnded {
        track_id: String,
    },
    /// One captured chunk of planar audio
    AudioFrame {
        track_id: String,
        audio: RawAudio,
    },

    /// Full membership refresh, protobuf bytes
    SyncResponse(Bytes),
    /// Full membership refresh, base64 text of the protobuf bytes
    SyncResponseBase64(String),
    /// Datachannel collection event, zlib-compressed protobuf bytes
    CollectionEvent(Bytes),
    /// Datachannel caption event
    CaptionEvent(Bytes),
    /// Envelope received from the consumer
    Inbound(Bytes),

    Shutdown,
}

impl BridgeEvent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            BridgeEvent::ChannelOpened => "channel_opened",
            BridgeEvent::ChannelClosed => "channel_closed",
            BridgeEvent::EnableMedia => "enable_media",
            BridgeEvent::DisableMedia => "disable_media",
            BridgeEvent::VideoTrackStarted { .. } => "video_track_started",
            BridgeEvent::VideoTrackEnded { .. } => "video_track_ended",
            BridgeEvent::VideoFrame { .. } => "video_frame",
            BridgeEvent::AudioTrackEnded { .. } => "audio_track_ended",
            BridgeEvent::AudioFrame { .. } => "audio_frame",
            BridgeEvent::SyncResponse(_) => "sync_response",
            BridgeEvent::SyncResponseBase64(_) => "sync_response_base64",
            BridgeEvent::CollectionEvent(_) => "collection_event",
            BridgeEvent::CaptionEvent(_) => "caption_event",
            BridgeEvent::Inbound(_) => "inbound",
            BridgeEvent::Shutdown => "shutdown",
        }
    }
}
