//! Video frame relay
//!
//! Throttles frames of the selected source and keeps the outbound video
//! cadence alive with filler frames when the source stalls.
//!
//! ```text
//!            tick: selected stream live
//!   ┌──────┐ ─────────────────────────► ┌───────────┐
//!   │ Idle │                            │ Streaming │
//!   └──────┘ ◄───────────────────────── └───────────┘
//!            tick: not live (last-known-good := placeholder)
//! ```

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use super::frame::VideoFrame;

/// Liveness of the selected source as of the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Filler uses the placeholder
    Idle,
    /// Filler repeats the last forwarded frame
    Streaming,
}

/// Throttle and filler state of the outbound video stream
#[derive(Debug)]
pub struct FrameRelay {
    min_frame_interval: Duration,
    gap_threshold: Duration,
    placeholder: VideoFrame,
    last_good: VideoFrame,
    last_sent_at: Instant,
    track_last_forwarded: HashMap<String, Instant>,
    state: RelayState,
}

impl FrameRelay {
    /// Create a relay whose staleness clock starts at `now`
    pub fn new(
        min_frame_interval: Duration,
        gap_threshold: Duration,
        placeholder: VideoFrame,
        now: Instant,
    ) -> Self {
        Self {
            min_frame_interval,
            gap_threshold,
            last_good: placeholder.clone(),
            placeholder,
            last_sent_at: now,
            track_last_forwarded: HashMap::new(),
            state: RelayState::Idle,
        }
    }

    /// Pass a captured frame through selection and throttling
    ///
    /// Returns the frame to send. A forwarded frame becomes the last-known-good
    /// frame; the staleness clock only moves once the caller reports the send
    /// through [`FrameRelay::mark_sent`].
    pub fn forward(
        &mut self,
        track_id: &str,
        frame: VideoFrame,
        selected_stream: Option<&str>,
        now: Instant,
    ) -> Option<VideoFrame> {
        if selected_stream != Some(frame.stream_id.as_str()) {
            return None;
        }

        if let Some(previous) = self.track_last_forwarded.get(track_id) {
            if now.saturating_duration_since(*previous) < self.min_frame_interval {
                return None;
            }
        }

        self.track_last_forwarded.insert(track_id.to_string(), now);
        self.last_good = frame.clone();
        Some(frame)
    }

    /// Timer tick; returns a filler frame if output has gone stale
    ///
    /// Keeps returning filler on every tick until a send is reported.
    pub fn on_tick(&mut self, stream_live: bool, now: Instant, timestamp_us: u64) -> Option<VideoFrame> {
        let next_state = if stream_live {
            RelayState::Streaming
        } else {
            // A later switch to a live stream must not replay this one's frames
            self.last_good = self.placeholder.clone();
            RelayState::Idle
        };
        if next_state != self.state {
            tracing::debug!(from = ?self.state, to = ?next_state, "Relay state changed");
            self.state = next_state;
        }

        if now.saturating_duration_since(self.last_sent_at) < self.gap_threshold {
            return None;
        }

        let source = match self.state {
            RelayState::Streaming => &self.last_good,
            RelayState::Idle => &self.placeholder,
        };
        Some(source.as_filler(timestamp_us))
    }

    /// Record that a real or filler frame reached the outbound channel
    pub fn mark_sent(&mut self, now: Instant) {
        self.last_sent_at = now;
    }

    /// Drop throttle state of an ended track
    pub fn forget_track(&mut self, track_id: &str) {
        self.track_last_forwarded.remove(track_id);
    }

    /// State as of the last tick
    pub fn state(&self) -> RelayState {
        self.state
    }

    /// When a frame last reached the outbound channel
    pub fn last_sent_at(&self) -> Instant {
        self.last_sent_at
    }
}
