//! Participant directory
//!
//! Holds every participant ever seen plus the authoritative "present" set,
//! and reduces each incoming snapshot to a joined/left/updated diff.

use std::collections::HashMap;

use serde::Serialize;

/// Membership status, mapped from the service's numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MembershipStatus {
    #[serde(rename = "in_meeting")]
    InMeeting,
    #[serde(rename = "not_in_meeting")]
    NotInMeeting,
    #[serde(rename = "removed_from_meeting")]
    Removed,
    #[serde(rename = "unknown")]
    Unknown,
}

impl MembershipStatus {
    /// Map the service's numeric status code
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => MembershipStatus::InMeeting,
            6 => MembershipStatus::NotInMeeting,
            7 => MembershipStatus::Removed,
            _ => MembershipStatus::Unknown,
        }
    }
}

/// Participant as extracted from a room record, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParticipant {
    pub device_id: String,
    pub display_name: String,
    pub full_name: String,
    pub profile_picture: String,
    pub status: u32,
    pub parent_device_id: Option<String>,
}

/// Normalized participant entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub device_id: String,
    pub display_name: String,
    pub full_name: String,
    pub profile_picture: String,
    /// Raw status code as sent by the service
    pub status: u32,
    #[serde(rename = "humanized_status")]
    pub membership: MembershipStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_device_id: Option<String>,
}

impl Participant {
    /// Normalize a raw record; an empty parent device id counts as none
    pub fn from_raw(raw: RawParticipant) -> Self {
        Self {
            membership: MembershipStatus::from_code(raw.status),
            device_id: raw.device_id,
            display_name: raw.display_name,
            full_name: raw.full_name,
            profile_picture: raw.profile_picture,
            status: raw.status,
            parent_device_id: raw.parent_device_id.filter(|p| !p.is_empty()),
        }
    }

    /// Status is in-meeting
    pub fn is_in_meeting(&self) -> bool {
        self.membership == MembershipStatus::InMeeting
    }

    /// Entry represents a screen-share source rather than a person
    pub fn is_screen_share_entry(&self) -> bool {
        self.parent_device_id.is_some()
    }
}

/// Change set produced by applying a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParticipantDiff {
    #[serde(rename = "newUsers")]
    pub joined: Vec<Participant>,
    #[serde(rename = "removedUsers")]
    pub left: Vec<Participant>,
    #[serde(rename = "updatedUsers")]
    pub updated: Vec<Participant>,
}

impl ParticipantDiff {
    /// Nothing joined, left or changed
    pub fn is_empty(&self) -> bool {
        self.joined.is_empty() && self.left.is_empty() && self.updated.is_empty()
    }
}

/// Present set keyed by device id, in first-appearance order
#[derive(Debug, Default, Clone)]
struct PresentSet {
    entries: Vec<Participant>,
    index: HashMap<String, usize>,
}

impl PresentSet {
    /// Build from a sequence; a repeated device id keeps its first position
    /// and takes the later value
    fn from_participants(participants: impl IntoIterator<Item = Participant>) -> Self {
        let mut set = PresentSet::default();
        for participant in participants {
            match set.index.get(&participant.device_id) {
                Some(&pos) => set.entries[pos] = participant,
                None => {
                    set.index
                        .insert(participant.device_id.clone(), set.entries.len());
                    set.entries.push(participant);
                }
            }
        }
        set
    }

    fn get(&self, device_id: &str) -> Option<&Participant> {
        self.index.get(device_id).map(|&pos| &self.entries[pos])
    }

    fn contains(&self, device_id: &str) -> bool {
        self.index.contains_key(device_id)
    }
}

/// Canonical participant state for one meeting
#[derive(Debug, Default)]
pub struct ParticipantDirectory {
    /// Every participant ever seen, latest value per device; never pruned
    all_seen: HashMap<String, Participant>,
    present: PresentSet,
}

impl ParticipantDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a full membership snapshot
    ///
    /// The present set is replaced by `batch`; callers must pass complete
    /// lists, since anyone missing from it is reported as having left.
    pub fn apply_batch(&mut self, batch: Vec<RawParticipant>) -> ParticipantDiff {
        self.replace_present(batch.into_iter().map(Participant::from_raw))
    }

    /// Apply a single participant record on top of the present set
    ///
    /// Never reports anyone else as having left.
    pub fn apply_single(&mut self, raw: RawParticipant) -> ParticipantDiff {
        let merged: Vec<Participant> = self
            .present
            .entries
            .iter()
            .cloned()
            .chain(std::iter::once(Participant::from_raw(raw)))
            .collect();
        self.replace_present(merged)
    }

    fn replace_present(&mut self, incoming: impl IntoIterator<Item = Participant>) -> ParticipantDiff {
        let next = PresentSet::from_participants(incoming);
        let mut diff = ParticipantDiff::default();

        for participant in &next.entries {
            match self.present.get(&participant.device_id) {
                None => diff.joined.push(participant.clone()),
                Some(previous) if previous != participant => diff.updated.push(participant.clone()),
                Some(_) => {}
            }
            self.all_seen
                .insert(participant.device_id.clone(), participant.clone());
        }

        diff.left = self
            .present
            .entries
            .iter()
            .filter(|p| !next.contains(&p.device_id))
            .cloned()
            .collect();

        self.present = next;

        if !diff.is_empty() {
            tracing::info!(
                joined = diff.joined.len(),
                left = diff.left.len(),
                updated = diff.updated.len(),
                present = self.present.entries.len(),
                "Participants changed"
            );
        }

        diff
    }

    /// Look up any participant ever seen
    pub fn get(&self, device_id: &str) -> Option<&Participant> {
        self.all_seen.get(device_id)
    }

    /// Current present set, in first-appearance order
    pub fn present(&self) -> &[Participant] {
        &self.present.entries
    }

    /// Present participants whose status is in-meeting
    pub fn in_meeting(&self) -> impl Iterator<Item = &Participant> {
        self.present.entries.iter().filter(|p| p.is_in_meeting())
    }

    /// Present, in-meeting screen-share entries
    pub fn screen_sharers(&self) -> impl Iterator<Item = &Participant> {
        self.in_meeting().filter(|p| p.is_screen_share_entry())
    }

    /// Number of participants ever seen
    pub fn all_seen_count(&self) -> usize {
        self.all_seen.len()
    }
}
