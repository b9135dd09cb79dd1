//! Room state
//!
//! Participants, device output routing, and captions, reconciled from the
//! decoded records of room snapshots and datachannel events.

pub mod captions;
pub mod outputs;
pub mod participants;
pub mod records;

pub use captions::{Caption, CaptionSync, CaptionVersionPolicy};
pub use outputs::{DeviceOutput, DeviceOutputRegistry, OutputKind, RawDeviceOutput};
pub use participants::{MembershipStatus, Participant, ParticipantDiff, ParticipantDirectory, RawParticipant};
pub use records::{ChatMessage, CollectionUpdate};
