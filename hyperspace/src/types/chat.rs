use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{MessageKind, MessageStatus, ThreadKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    pub media_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
    pub is_self: bool,
}

/// A DM or group conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ThreadKind,
    pub messages: Vec<Message>,
    pub unread_count: u32,
}
