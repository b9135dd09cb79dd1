//! Record formats of the meeting service
//!
//! Field tags and nesting mirror the service's wire contract. Names follow the
//! service's camelCase so decoded records read the same as captured payloads.
//!
//! ```text
//! CollectionEvent
//! └─ body: CollectionEventBody
//!    └─ userInfoListWrapperAndChatWrapperWrapper
//!       ├─ deviceInfoWrapper
//!       │  └─ deviceOutputInfoList[]: DeviceOutputInfoList
//!       └─ userInfoListWrapperAndChatWrapper
//!          ├─ userInfoListWrapper
//!          │  └─ userInfoList[]: UserInfoList
//!          └─ chatMessageWrapper[]
//!             └─ chatMessage: ChatMessage
//!
//! UserInfoListResponse
//! └─ userInfoListWrapperWrapper
//!    └─ userInfoListWrapper
//!       └─ userInfoList[]: UserInfoList
//!
//! CaptionWrapper
//! └─ caption: Caption
//! ```

use super::table::{FieldSchema, MessageSchema};

/// Schema name of `CollectionEvent`
pub const COLLECTION_EVENT: &str = "CollectionEvent";
/// Schema name of `CollectionEventBody`
pub const COLLECTION_EVENT_BODY: &str = "CollectionEventBody";
/// Schema name of `UserInfoListWrapperAndChatWrapperWrapper`
pub const USER_INFO_AND_CHAT_OUTER: &str = "UserInfoListWrapperAndChatWrapperWrapper";
/// Schema name of `UserInfoListWrapperAndChatWrapper`
pub const USER_INFO_AND_CHAT: &str = "UserInfoListWrapperAndChatWrapper";
/// Schema name of `DeviceInfoWrapper`
pub const DEVICE_INFO_WRAPPER: &str = "DeviceInfoWrapper";
/// Schema name of `DeviceOutputInfoList`
pub const DEVICE_OUTPUT_INFO: &str = "DeviceOutputInfoList";
/// Schema name of `DeviceOutputStatus`
pub const DEVICE_OUTPUT_STATUS: &str = "DeviceOutputStatus";
/// Schema name of `UserInfoListResponse`
pub const USER_INFO_LIST_RESPONSE: &str = "UserInfoListResponse";
/// Schema name of `UserInfoListWrapperWrapper`
pub const USER_INFO_LIST_WRAPPER_WRAPPER: &str = "UserInfoListWrapperWrapper";
/// Schema name of `UserEventInfo`
pub const USER_EVENT_INFO: &str = "UserEventInfo";
/// Schema name of `UserInfoListWrapper`
pub const USER_INFO_LIST_WRAPPER: &str = "UserInfoListWrapper";
/// Schema name of `UserInfoList`
pub const USER_INFO_LIST: &str = "UserInfoList";
/// Schema name of `CaptionWrapper`
pub const CAPTION_WRAPPER: &str = "CaptionWrapper";
/// Schema name of `Caption`
pub const CAPTION: &str = "Caption";
/// Schema name of `ChatMessageWrapper`
pub const CHAT_MESSAGE_WRAPPER: &str = "ChatMessageWrapper";
/// Schema name of `ChatMessage`
pub const CHAT_MESSAGE: &str = "ChatMessage";
/// Schema name of `ChatMessageContent`
pub const CHAT_MESSAGE_CONTENT: &str = "ChatMessageContent";

/// Field tables of every meeting record
pub static SCHEMAS: &[MessageSchema] = &[
    MessageSchema {
        name: COLLECTION_EVENT,
        fields: &[FieldSchema::message("body", 1, COLLECTION_EVENT_BODY)],
    },
    MessageSchema {
        name: COLLECTION_EVENT_BODY,
        fields: &[FieldSchema::message(
            "userInfoListWrapperAndChatWrapperWrapper",
            2,
            USER_INFO_AND_CHAT_OUTER,
        )],
    },
    MessageSchema {
        name: USER_INFO_AND_CHAT_OUTER,
        fields: &[
            FieldSchema::message("deviceInfoWrapper", 3, DEVICE_INFO_WRAPPER),
            FieldSchema::message("userInfoListWrapperAndChatWrapper", 13, USER_INFO_AND_CHAT),
        ],
    },
    MessageSchema {
        name: USER_INFO_AND_CHAT,
        fields: &[
            FieldSchema::message("userInfoListWrapper", 1, USER_INFO_LIST_WRAPPER),
            FieldSchema::message("chatMessageWrapper", 4, CHAT_MESSAGE_WRAPPER).repeated(),
        ],
    },
    MessageSchema {
        name: DEVICE_INFO_WRAPPER,
        fields: &[FieldSchema::message("deviceOutputInfoList", 2, DEVICE_OUTPUT_INFO).repeated()],
    },
    MessageSchema {
        name: DEVICE_OUTPUT_INFO,
        fields: &[
            // 1 = audio, 2 = video
            FieldSchema::varint("deviceOutputType", 2),
            FieldSchema::string("streamId", 4),
            FieldSchema::string("deviceId", 6),
            FieldSchema::message("deviceOutputStatus", 10, DEVICE_OUTPUT_STATUS),
        ],
    },
    MessageSchema {
        name: DEVICE_OUTPUT_STATUS,
        fields: &[FieldSchema::varint("disabled", 1)],
    },
    MessageSchema {
        name: USER_INFO_LIST_RESPONSE,
        fields: &[FieldSchema::message(
            "userInfoListWrapperWrapper",
            2,
            USER_INFO_LIST_WRAPPER_WRAPPER,
        )],
    },
    MessageSchema {
        name: USER_INFO_LIST_WRAPPER_WRAPPER,
        fields: &[FieldSchema::message("userInfoListWrapper", 2, USER_INFO_LIST_WRAPPER)],
    },
    MessageSchema {
        name: USER_EVENT_INFO,
        fields: &[FieldSchema::varint("eventNumber", 1)],
    },
    MessageSchema {
        name: USER_INFO_LIST_WRAPPER,
        fields: &[
            FieldSchema::message("userEventInfo", 1, USER_EVENT_INFO),
            FieldSchema::message("userInfoList", 2, USER_INFO_LIST).repeated(),
        ],
    },
    MessageSchema {
        name: USER_INFO_LIST,
        fields: &[
            FieldSchema::string("deviceId", 1),
            FieldSchema::string("fullName", 2),
            FieldSchema::string("profilePicture", 3),
            // 1 = in meeting, 6 = not in meeting, 7 = removed
            FieldSchema::varint("status", 4),
            // Set only on screen-share entries; names the sharing device
            FieldSchema::string("parentDeviceId", 21),
            FieldSchema::string("displayName", 29),
        ],
    },
    MessageSchema {
        name: CAPTION_WRAPPER,
        fields: &[FieldSchema::message("caption", 1, CAPTION)],
    },
    MessageSchema {
        name: CAPTION,
        fields: &[
            FieldSchema::string("deviceId", 1),
            FieldSchema::int64("captionId", 2),
            FieldSchema::int64("version", 3),
            FieldSchema::string("text", 6),
            FieldSchema::int64("languageId", 8),
        ],
    },
    MessageSchema {
        name: CHAT_MESSAGE_WRAPPER,
        fields: &[FieldSchema::message("chatMessage", 2, CHAT_MESSAGE)],
    },
    MessageSchema {
        name: CHAT_MESSAGE,
        fields: &[
            FieldSchema::string("messageId", 1),
            FieldSchema::string("deviceId", 2),
            FieldSchema::int64("timestamp", 3),
            FieldSchema::message("chatMessageContent", 5, CHAT_MESSAGE_CONTENT),
        ],
    },
    MessageSchema {
        name: CHAT_MESSAGE_CONTENT,
        fields: &[FieldSchema::string("text", 1)],
    },
];
