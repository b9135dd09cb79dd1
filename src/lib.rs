//! meet-bridge: media and room-state bridge for a live meeting
//!
//! Captured video frames, audio, and protobuf-encoded room events go in as
//! [`BridgeEvent`]s; one ordered stream of binary envelopes comes out for an
//! external recorder.
//!
//! # Example
//!
//! ```no_run
//! use meet_bridge::{Bridge, BridgeConfig, BridgeEvent};
//!
//! # async fn run() -> meet_bridge::Result<()> {
//! let (bridge, mut outbound) = Bridge::new(BridgeConfig::default())?;
//! let (events, task) = bridge.spawn();
//!
//! events.send(BridgeEvent::ChannelOpened).await.ok();
//! events.send(BridgeEvent::EnableMedia).await.ok();
//!
//! while let Some(envelope) = outbound.recv().await {
//!     // write `envelope` to the consumer
//! #   let _ = envelope;
//! }
//! # let _ = task;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod media;
pub mod protocol;
pub mod room;
pub mod schema;
pub mod stats;

pub use bridge::{Bridge, BridgeEvent};
pub use config::BridgeConfig;
pub use error::{ConfigurationError, DecodeError, Error, Result};
pub use stats::BridgeStats;
