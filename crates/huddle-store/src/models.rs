//! Domain model structs for users and messages.
//!
//! [`IncomingMessage`] is the loose shape a transport hands over; it only
//! becomes a [`Message`] after validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use huddle_shared::{MessageId, UserId};

use crate::error::{Result, StoreError};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A conversation partner from the roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable backend identifier.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name.
    pub full_name: String,
    /// Optional avatar URL.
    #[serde(default)]
    pub profile_pic: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            full_name: full_name.into(),
            profile_pic: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A validated direct message. Immutable once ingested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    /// Text body, if any.
    pub text: Option<String>,
    /// Image URL, if any.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Message {
    /// Whether the message carries an image.
    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Text body, treating an empty string as absent.
    pub fn text_body(&self) -> Option<&str> {
        self.text.as_deref().filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// IncomingMessage
// ---------------------------------------------------------------------------

/// Unvalidated message as delivered by a fetch or the live feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub receiver_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read: bool,
}

impl From<Message> for IncomingMessage {
    fn from(m: Message) -> Self {
        Self {
            id: Some(m.id.0),
            sender_id: Some(m.sender_id.0),
            receiver_id: Some(m.receiver_id.0),
            text: m.text,
            image: m.image,
            created_at: Some(m.created_at),
            read: m.read,
        }
    }
}

impl TryFrom<IncomingMessage> for Message {
    type Error = StoreError;

    fn try_from(raw: IncomingMessage) -> Result<Self> {
        let id = required(raw.id, "id")?;
        let sender_id = required(raw.sender_id, "senderId")?;
        let receiver_id = required(raw.receiver_id, "receiverId")?;
        let created_at = raw
            .created_at
            .ok_or(StoreError::MalformedMessage { field: "createdAt" })?;

        Ok(Message {
            id: MessageId(id),
            sender_id: UserId(sender_id),
            receiver_id: UserId(receiver_id),
            text: raw.text,
            image: raw.image,
            created_at,
            read: raw.read,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(StoreError::MalformedMessage { field }),
    }
}
