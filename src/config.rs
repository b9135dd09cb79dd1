//! Bridge configuration

use std::time::Duration;

use crate::room::CaptionVersionPolicy;

/// Bridge configuration options
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Minimum spacing between forwarded frames of one track
    pub min_frame_interval: Duration,

    /// How often the filler timer fires while media is enabled
    pub filler_tick_period: Duration,

    /// Output silence after which a filler frame is sent
    pub filler_gap_threshold: Duration,

    /// Placeholder frame width
    pub placeholder_width: u32,

    /// Placeholder frame height
    pub placeholder_height: u32,

    /// Capacity of the inbound event queue
    pub event_queue_capacity: usize,

    /// Capacity of the outbound message queue
    pub outbound_capacity: usize,

    /// Treatment of out-of-order caption revisions
    pub caption_policy: CaptionVersionPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            min_frame_interval: Duration::from_millis(1),
            filler_tick_period: Duration::from_millis(250),
            filler_gap_threshold: Duration::from_millis(500),
            placeholder_width: 1920,
            placeholder_height: 1080,
            event_queue_capacity: 1024,
            outbound_capacity: 256,
            caption_policy: CaptionVersionPolicy::LastWriteWins,
        }
    }
}

impl BridgeConfig {
    /// Set the per-track frame interval
    pub fn min_frame_interval(mut self, interval: Duration) -> Self {
        self.min_frame_interval = interval;
        self
    }

    /// Set filler tick period and gap threshold
    pub fn filler_timing(mut self, tick_period: Duration, gap_threshold: Duration) -> Self {
        // A zero period would panic in tokio::time::interval
        self.filler_tick_period = tick_period.max(Duration::from_millis(1));
        self.filler_gap_threshold = gap_threshold;
        self
    }

    /// Set placeholder frame dimensions
    pub fn placeholder_size(mut self, width: u32, height: u32) -> Self {
        self.placeholder_width = width;
        self.placeholder_height = height;
        self
    }

    /// Set the inbound event queue capacity
    pub fn event_queue_capacity(mut self, capacity: usize) -> Self {
        self.event_queue_capacity = capacity.max(1);
        self
    }

    /// Set the outbound message queue capacity
    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity.max(1);
        self
    }

    /// Set the caption version policy
    pub fn caption_policy(mut self, policy: CaptionVersionPolicy) -> Self {
        self.caption_policy = policy;
        self
    }
}
