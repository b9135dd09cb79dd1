//! Device output routing
//!
//! Maps each (device, output kind) pair to the stream it is currently routed
//! to. Every incoming record fully replaces the entry for its key but keeps
//! the position the key was first inserted at.

use std::collections::btree_map::{BTreeMap, Entry};

use serde::{Serialize, Serializer};

/// Output kind, as coded by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputKind {
    Audio,
    Video,
}

impl OutputKind {
    /// Map the service's numeric code; unknown codes give `None`
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(OutputKind::Audio),
            2 => Some(OutputKind::Video),
            _ => None,
        }
    }

    /// Numeric code used on the wire and in control documents
    pub fn code(self) -> u32 {
        match self {
            OutputKind::Audio => 1,
            OutputKind::Video => 2,
        }
    }
}

impl Serialize for OutputKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

/// Device output as extracted from a collection event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDeviceOutput {
    pub device_id: String,
    pub output_type: u32,
    pub stream_id: String,
    pub disabled: bool,
}

/// Routing descriptor for one device output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceOutput {
    pub device_id: String,
    #[serde(rename = "outputType")]
    pub kind: OutputKind,
    pub stream_id: String,
    pub disabled: bool,
    /// Microseconds on the bridge clock
    #[serde(rename = "lastUpdated")]
    pub updated_at_us: u64,
}

#[derive(Debug)]
struct Routed {
    /// Insertion sequence of the key, kept across replacements
    seq: u64,
    output: DeviceOutput,
}

/// Registry of device outputs keyed by (device id, kind)
#[derive(Debug, Default)]
pub struct DeviceOutputRegistry {
    outputs: BTreeMap<(String, OutputKind), Routed>,
    next_seq: u64,
}

impl DeviceOutputRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert every record in `batch`, returning how many were applied
    pub fn apply_batch(&mut self, batch: Vec<RawDeviceOutput>, now_us: u64) -> usize {
        let mut applied = 0;
        for raw in batch {
            let Some(kind) = OutputKind::from_code(raw.output_type) else {
                tracing::warn!(
                    device = %raw.device_id,
                    output_type = raw.output_type,
                    "Skipping device output with unknown kind"
                );
                continue;
            };

            tracing::debug!(
                device = %raw.device_id,
                kind = ?kind,
                stream = %raw.stream_id,
                disabled = raw.disabled,
                "Device output updated"
            );

            let output = DeviceOutput {
                device_id: raw.device_id,
                kind,
                stream_id: raw.stream_id,
                disabled: raw.disabled,
                updated_at_us: now_us,
            };
            match self.outputs.entry((output.device_id.clone(), kind)) {
                Entry::Occupied(mut slot) => slot.get_mut().output = output,
                Entry::Vacant(slot) => {
                    slot.insert(Routed {
                        seq: self.next_seq,
                        output,
                    });
                    self.next_seq += 1;
                }
            }
            applied += 1;
        }
        applied
    }

    /// Get the output of one device and kind
    pub fn lookup(&self, device_id: &str, kind: OutputKind) -> Option<&DeviceOutput> {
        self.outputs
            .get(&(device_id.to_string(), kind))
            .map(|routed| &routed.output)
    }

    /// Whether the earliest-inserted output routed to `stream_id` is enabled
    ///
    /// Unknown stream ids are not live.
    pub fn is_stream_enabled(&self, stream_id: &str) -> bool {
        self.outputs
            .values()
            .filter(|routed| routed.output.stream_id == stream_id)
            .min_by_key(|routed| routed.seq)
            .is_some_and(|routed| !routed.output.disabled)
    }

    /// Full contents, ordered by key
    pub fn snapshot(&self) -> Vec<DeviceOutput> {
        self.outputs.values().map(|routed| routed.output.clone()).collect()
    }

    /// Number of (device, kind) entries
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Check if no output has been routed yet
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}
