//! Statistics for a bridge session

use std::time::Duration;

/// Bridge-level counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Video frames forwarded from the selected source
    pub video_frames: u64,
    /// Filler frames sent by the timer
    pub filler_frames: u64,
    /// Audio chunks sent
    pub audio_chunks: u64,
    /// Control documents sent
    pub control_messages: u64,
    /// Envelopes dropped because the channel was unavailable
    pub dropped_sends: u64,
    /// Inbound payloads rejected as malformed
    pub decode_errors: u64,
    /// Total envelope bytes queued
    pub bytes_sent: u64,
    /// Time since the bridge was created
    pub uptime: Duration,
}

impl BridgeStats {
    /// Zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Envelopes successfully queued
    pub fn messages_sent(&self) -> u64 {
        self.video_frames + self.filler_frames + self.audio_chunks + self.control_messages
    }

    /// Outbound rate in bits per second
    pub fn bitrate(&self) -> u64 {
        let secs = self.uptime.as_secs();
        if secs > 0 {
            (self.bytes_sent * 8) / secs
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_stats_new() {
        let stats = BridgeStats::new();
        assert_eq!(stats.video_frames, 0);
        assert_eq!(stats.filler_frames, 0);
        assert_eq!(stats.dropped_sends, 0);
        assert_eq!(stats.messages_sent(), 0);
    }

    #[test]
    fn test_messages_sent() {
        let stats = BridgeStats {
            video_frames: 3,
            filler_frames: 2,
            audio_chunks: 5,
            control_messages: 1,
            dropped_sends: 9,
            ..Default::default()
        };
        assert_eq!(stats.messages_sent(), 11);
    }

    #[test]
    fn test_bitrate() {
        let stats = BridgeStats {
            bytes_sent: 1_000_000,
            uptime: Duration::from_secs(10),
            ..Default::default()
        };
        assert_eq!(stats.bitrate(), 800_000);
    }

    #[test]
    fn test_bitrate_zero_uptime() {
        let stats = BridgeStats {
            bytes_sent: 1_000_000,
            ..Default::default()
        };
        assert_eq!(stats.bitrate(), 0);
    }
}
