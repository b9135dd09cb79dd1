//! Outbound channel to the consumer
//!
//! Sends are best-effort: a message that cannot be queued right now is
//! dropped, never retried.

use bytes::Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::error::{Error, Result};

/// Best-effort sender of encoded envelopes with open and media gates
#[derive(Debug)]
pub struct OutboundChannel {
    tx: mpsc::Sender<Bytes>,
    open: bool,
    media_enabled: bool,
}

impl OutboundChannel {
    /// Create a channel and the receiver the transport drains
    ///
    /// The channel starts closed with media disabled.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let channel = Self {
            tx,
            open: false,
            media_enabled: false,
        };
        (channel, rx)
    }

    /// Mark the transport as open
    pub fn open(&mut self) {
        if !self.open {
            tracing::info!("Outbound channel opened");
        }
        self.open = true;
    }

    /// Mark the transport as closed; later sends are dropped
    pub fn close(&mut self) {
        if self.open {
            tracing::info!("Outbound channel closed");
        }
        self.open = false;
    }

    /// Open and the receiver is still alive
    pub fn is_open(&self) -> bool {
        self.open && !self.tx.is_closed()
    }

    /// Gate media sends
    pub fn set_media_enabled(&mut self, enabled: bool) {
        if enabled != self.media_enabled {
            tracing::info!(enabled, "Media sending toggled");
        }
        self.media_enabled = enabled;
    }

    /// Whether media sends are enabled
    pub fn media_enabled(&self) -> bool {
        self.media_enabled
    }

    /// Queue one encoded envelope
    pub fn send(&mut self, envelope: Bytes) -> Result<()> {
        if !self.open {
            return Err(Error::ChannelUnavailable("not open"));
        }

        match self.tx.try_send(envelope) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(Error::ChannelUnavailable("full")),
            Err(TrySendError::Closed(_)) => {
                self.close();
                Err(Error::ChannelUnavailable("closed"))
            }
        }
    }
}
