//! Per-conversation summaries derived from the history store.
//!
//! Everything here is recomputed from scratch on each call; there are no
//! running counters to drift.

use chrono::{DateTime, Utc};
use serde::Serialize;

use huddle_shared::UserId;
use huddle_store::{HistoryStore, Message, User};

/// Derived display record for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub user_id: UserId,
    pub last_message: Option<Message>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: usize,
    pub has_history: bool,
    /// Text of the last message, the image label, or empty.
    pub preview: String,
}

impl ConversationSummary {
    /// Summary of a conversation with no history.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            last_message: None,
            last_message_at: None,
            unread_count: 0,
            has_history: false,
            preview: String::new(),
        }
    }
}

/// A roster user paired with their summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRow {
    pub user: User,
    pub summary: ConversationSummary,
}

/// Summarize `history`, the conversation between `current` and `user`.
pub fn summarize(
    user: &UserId,
    history: &[Message],
    current: &UserId,
    image_label: &str,
) -> ConversationSummary {
    let Some(last) = history.last() else {
        return ConversationSummary::empty(user.clone());
    };

    let unread_count = history
        .iter()
        .filter(|m| &m.sender_id == user && &m.sender_id != current && !m.read)
        .count();

    ConversationSummary {
        user_id: user.clone(),
        last_message_at: Some(last.created_at),
        preview: preview_text(last, image_label),
        last_message: Some(last.clone()),
        unread_count,
        has_history: true,
    }
}

/// Preview for `message`: its text, else `image_label` for an image, else empty.
pub fn preview_text(message: &Message, image_label: &str) -> String {
    if let Some(text) = message.text_body() {
        text.to_string()
    } else if message.has_image() {
        image_label.to_string()
    } else {
        String::new()
    }
}

/// One row per roster user, in roster order.
pub fn summarize_roster(
    store: &HistoryStore,
    roster: &[User],
    current: &UserId,
    image_label: &str,
) -> Vec<ConversationRow> {
    roster
        .iter()
        .map(|user| ConversationRow {
            summary: summarize(&user.id, store.get(&user.id), current, image_label),
            user: user.clone(),
        })
        .collect()
}
