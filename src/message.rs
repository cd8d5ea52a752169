use base64::Engine;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

pub type MessageId = u64;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A file carried inline by a message, encoded as a base64 data URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    pub data: String,
}

impl Attachment {
    pub fn from_bytes(name: &str, mime_type: &str, bytes: &[u8]) -> Attachment {
        let uri_type = if mime_type.is_empty() {
            FALLBACK_MIME_TYPE
        } else {
            mime_type
        };
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        Attachment {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
            data: format!("data:{};base64,{}", uri_type, payload),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Attachment>,
}

pub type Messages = Vec<Message>;

/// A message that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub text: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub file: Option<Attachment>,
}

impl NewMessage {
    /// Returns `None` when there is neither non-blank text nor a file.
    pub fn new(text: &str, file: Option<Attachment>, timestamp: DateTime<Utc>) -> Option<NewMessage> {
        let text = text.trim();
        let text = if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        if text.is_none() && file.is_none() {
            return None;
        }
        Some(NewMessage {
            text,
            timestamp,
            file,
        })
    }

    pub fn into_message(self, id: MessageId) -> Message {
        Message {
            id,
            text: self.text,
            timestamp: self.timestamp,
            file: self.file,
        }
    }
}

/// Current time truncated to milliseconds, the precision timestamps are stored with.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Millisecond timestamp of `now`, bumped past `last` so ids never repeat.
pub fn next_id(last: Option<MessageId>, now: DateTime<Utc>) -> MessageId {
    let candidate = now.timestamp_millis().max(0) as MessageId;
    match last {
        Some(last) if candidate <= last => last.saturating_add(1),
        _ => candidate,
    }
}

pub fn last_id(messages: &[Message]) -> Option<MessageId> {
    messages.iter().map(|m| m.id).max()
}
