//! Video source selection
//!
//! Exactly one video source is forwarded at a time: the newest screen share
//! if any exists, otherwise the newest camera. The choice is memoized and the
//! memo is dropped on every mutation.

use std::collections::HashMap;

use tokio::time::Instant;

/// A known video track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    pub track_id: String,
    pub stream_id: String,
    pub is_screen_share: bool,
    /// Set on first insertion, kept across re-upserts
    pub first_seen_at: Instant,
    /// Insertion order, breaks ties on `first_seen_at`
    sequence: u64,
}

impl VideoSource {
    fn rank(&self) -> (Instant, u64) {
        (self.first_seen_at, self.sequence)
    }
}

/// Known video tracks and the memoized choice of which one to forward
#[derive(Debug, Default)]
pub struct TrackSelector {
    sources: HashMap<String, VideoSource>,
    next_sequence: u64,
    /// `None` = stale, `Some(None)` = nothing to select
    selection: Option<Option<String>>,
}

impl TrackSelector {
    /// Create an empty selector
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a track
    pub fn upsert(&mut self, track_id: &str, stream_id: &str, is_screen_share: bool, now: Instant) {
        match self.sources.get_mut(track_id) {
            Some(source) => {
                source.stream_id = stream_id.to_string();
                source.is_screen_share = is_screen_share;
            }
            None => {
                let sequence = self.next_sequence;
                self.next_sequence += 1;
                self.sources.insert(
                    track_id.to_string(),
                    VideoSource {
                        track_id: track_id.to_string(),
                        stream_id: stream_id.to_string(),
                        is_screen_share,
                        first_seen_at: now,
                        sequence,
                    },
                );
            }
        }

        tracing::info!(
            track = %track_id,
            stream = %stream_id,
            screen_share = is_screen_share,
            "Video track upserted"
        );
        self.invalidate();
    }

    /// Forget a track, returning it if it was known
    pub fn remove(&mut self, track_id: &str) -> Option<VideoSource> {
        let removed = self.sources.remove(track_id);
        if removed.is_some() {
            tracing::info!(track = %track_id, "Video track removed");
        }
        self.invalidate();
        removed
    }

    /// Drop the memoized selection
    pub fn invalidate(&mut self) {
        self.selection = None;
    }

    /// The source to forward, if any
    pub fn current_selection(&mut self) -> Option<&VideoSource> {
        if self.selection.is_none() {
            self.selection = Some(self.select().map(|s| s.track_id.clone()));
        }
        let track_id = self.selection.as_ref()?.as_ref()?;
        self.sources.get(track_id)
    }

    /// Stream id of the current selection
    pub fn current_stream_id(&mut self) -> Option<String> {
        self.current_selection().map(|s| s.stream_id.clone())
    }

    fn select(&self) -> Option<&VideoSource> {
        let newest = |screen_share: bool| {
            self.sources
                .values()
                .filter(|s| s.is_screen_share == screen_share)
                .max_by_key(|s| s.rank())
        };
        newest(true).or_else(|| newest(false))
    }

    /// Stream a track feeds, if the track is known
    pub fn stream_id_of(&self, track_id: &str) -> Option<&str> {
        self.sources.get(track_id).map(|s| s.stream_id.as_str())
    }

    /// Number of known tracks
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if no track is known
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
