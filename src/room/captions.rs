//! Closed-caption store
//!
//! Captions are revised in place by the service: the same caption id arrives
//! again with a new version and longer text.

use std::collections::HashMap;

use serde::Serialize;

/// One caption revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Caption {
    pub caption_id: i64,
    pub device_id: String,
    pub version: i64,
    pub text: String,
    pub language_id: i64,
}

/// How out-of-order revisions are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptionVersionPolicy {
    /// Store and forward every revision as it arrives
    #[default]
    LastWriteWins,
    /// Drop revisions strictly older than the stored one
    RejectStale,
}

/// Latest caption per caption id
#[derive(Debug, Default)]
pub struct CaptionSync {
    captions: HashMap<i64, Caption>,
    policy: CaptionVersionPolicy,
}

impl CaptionSync {
    /// Create an empty store with the given version policy
    pub fn new(policy: CaptionVersionPolicy) -> Self {
        Self {
            captions: HashMap::new(),
            policy,
        }
    }

    /// Store a revision and return it if it should be forwarded
    pub fn apply(&mut self, caption: Caption) -> Option<&Caption> {
        if self.policy == CaptionVersionPolicy::RejectStale {
            if let Some(stored) = self.captions.get(&caption.caption_id) {
                if caption.version < stored.version {
                    tracing::debug!(
                        caption_id = caption.caption_id,
                        version = caption.version,
                        stored_version = stored.version,
                        "Dropping stale caption revision"
                    );
                    return None;
                }
            }
        }

        let id = caption.caption_id;
        self.captions.insert(id, caption);
        self.captions.get(&id)
    }

    /// Stored caption for an id
    pub fn get(&self, caption_id: i64) -> Option<&Caption> {
        self.captions.get(&caption_id)
    }

    /// Version policy in effect
    pub fn policy(&self) -> CaptionVersionPolicy {
        self.policy
    }

    /// Number of stored captions
    pub fn len(&self) -> usize {
        self.captions.len()
    }

    /// Check if no caption is stored
    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }
}
