//! Message thread for the selected conversation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use huddle_shared::constants::IMAGE_DOWNLOAD_PREFIX;
use huddle_shared::UserId;
use huddle_store::Message;

/// One bubble in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadEntry {
    pub message: Message,
    /// Sent by the current user (rendered on the right-hand side).
    pub is_own: bool,
    /// `HH:MM` in UTC.
    pub time_label: String,
    /// Suggested file name when saving the attached image.
    pub download_name: Option<String>,
}

pub fn format_message_time(at: DateTime<Utc>) -> String {
    at.format("%H:%M").to_string()
}

pub fn image_download_name(message: &Message) -> Option<String> {
    message
        .has_image()
        .then(|| format!("{IMAGE_DOWNLOAD_PREFIX}{}.jpg", message.id))
}

/// Build the thread view over `history`, keeping stored order.
pub fn build_thread(history: &[Message], current: &UserId) -> Vec<ThreadEntry> {
    history
        .iter()
        .map(|m| ThreadEntry {
            is_own: &m.sender_id == current,
            time_label: format_message_time(m.created_at),
            download_name: image_download_name(m),
            message: m.clone(),
        })
        .collect()
}
