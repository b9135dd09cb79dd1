//! Typed extraction from decoded meeting records
//!
//! Everything here is pure: bytes in, raw inputs out. Absent wrappers anywhere
//! along a path read as empty sequences.

use crate::error::{Error, Result};
use crate::schema::{meeting, Record, SchemaRegistry, Value};

use super::captions::Caption;
use super::outputs::RawDeviceOutput;
use super::participants::RawParticipant;

/// Chat message carried by a collection event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessage {
    pub message_id: String,
    pub device_id: String,
    pub timestamp: i64,
    pub text: String,
}

/// Everything one collection event carries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionUpdate {
    pub device_outputs: Vec<RawDeviceOutput>,
    pub participants: Vec<RawParticipant>,
    pub chat_messages: Vec<ChatMessage>,
}

fn string_of(record: &Record, name: &str) -> String {
    record.get_str(name).unwrap_or_default().to_string()
}

fn messages(values: &[Value]) -> impl Iterator<Item = &Record> {
    values.iter().filter_map(Value::as_message)
}

fn list_at<'r>(root: &'r Record, path: &[&str], list: &str) -> &'r [Value] {
    root.path(path).map(|r| r.get_list(list)).unwrap_or(&[])
}

/// Extract a participant; missing fields become defaults
pub fn participant_from_record(record: &Record) -> RawParticipant {
    RawParticipant {
        device_id: string_of(record, "deviceId"),
        display_name: string_of(record, "displayName"),
        full_name: string_of(record, "fullName"),
        profile_picture: string_of(record, "profilePicture"),
        status: record.get_uint("status").unwrap_or_default(),
        parent_device_id: record
            .get_str("parentDeviceId")
            .filter(|p| !p.is_empty())
            .map(str::to_string),
    }
}

/// Extract a device output; a missing status counts as enabled
pub fn device_output_from_record(record: &Record) -> RawDeviceOutput {
    RawDeviceOutput {
        device_id: string_of(record, "deviceId"),
        output_type: record.get_uint("deviceOutputType").unwrap_or_default(),
        stream_id: string_of(record, "streamId"),
        disabled: record
            .path(&["deviceOutputStatus"])
            .and_then(|s| s.get_uint("disabled"))
            .is_some_and(|d| d != 0),
    }
}

/// Extract a caption
pub fn caption_from_record(record: &Record) -> Caption {
    Caption {
        caption_id: record.get_int("captionId").unwrap_or_default(),
        device_id: string_of(record, "deviceId"),
        version: record.get_int("version").unwrap_or_default(),
        text: string_of(record, "text"),
        language_id: record.get_int("languageId").unwrap_or_default(),
    }
}

/// Extract a chat message
pub fn chat_from_record(record: &Record) -> ChatMessage {
    ChatMessage {
        message_id: string_of(record, "messageId"),
        device_id: string_of(record, "deviceId"),
        timestamp: record.get_int("timestamp").unwrap_or_default(),
        text: record
            .path(&["chatMessageContent"])
            .map(|c| string_of(c, "text"))
            .unwrap_or_default(),
    }
}

/// Participants of a full membership refresh
pub fn parse_sync_response(registry: &SchemaRegistry, data: &[u8]) -> Result<Vec<RawParticipant>> {
    let response = registry.decode_slice(meeting::USER_INFO_LIST_RESPONSE, data)?;
    let users = list_at(
        &response,
        &["userInfoListWrapperWrapper", "userInfoListWrapper"],
        "userInfoList",
    );
    Ok(messages(users).map(participant_from_record).collect())
}

/// Device outputs, participants, and chat of one collection event
pub fn parse_collection_event(registry: &SchemaRegistry, data: &[u8]) -> Result<CollectionUpdate> {
    let event = registry.decode_slice(meeting::COLLECTION_EVENT, data)?;
    let Some(outer) = event.path(&["body", "userInfoListWrapperAndChatWrapperWrapper"]) else {
        return Ok(CollectionUpdate::default());
    };

    let device_outputs = list_at(outer, &["deviceInfoWrapper"], "deviceOutputInfoList");
    let participants = list_at(
        outer,
        &["userInfoListWrapperAndChatWrapper", "userInfoListWrapper"],
        "userInfoList",
    );
    let chats = list_at(outer, &["userInfoListWrapperAndChatWrapper"], "chatMessageWrapper");

    Ok(CollectionUpdate {
        device_outputs: messages(device_outputs).map(device_output_from_record).collect(),
        participants: messages(participants).map(participant_from_record).collect(),
        chat_messages: messages(chats)
            .filter_map(|w| w.get_message("chatMessage"))
            .map(chat_from_record)
            .collect(),
    })
}

/// The caption revision of a caption event
pub fn parse_caption_event(registry: &SchemaRegistry, data: &[u8]) -> Result<Caption> {
    let wrapper = registry.decode_slice(meeting::CAPTION_WRAPPER, data)?;
    wrapper
        .get_message("caption")
        .map(caption_from_record)
        .ok_or_else(|| Error::UpstreamInconsistency("caption event without caption".into()))
}
