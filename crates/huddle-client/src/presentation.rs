//! Small formatting helpers for rendering a conversation row.

use huddle_shared::constants::{PRESENCE_OFFLINE, PRESENCE_ONLINE};

use crate::aggregator::ConversationSummary;

/// Avatar fallback: first letter of each word, uppercased.
pub fn initials(full_name: &str) -> String {
    full_name
        .split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Badge text for `count` unread messages, `None` when there are none.
pub fn unread_badge(count: usize, cap: usize) -> Option<String> {
    match count {
        0 => None,
        n if n > cap => Some(format!("{cap}+")),
        n => Some(n.to_string()),
    }
}

pub fn presence_label(online: bool) -> &'static str {
    if online {
        PRESENCE_ONLINE
    } else {
        PRESENCE_OFFLINE
    }
}

/// The summary preview, or `placeholder` when there is nothing to preview
/// (no history, or a last message with neither text nor image).
pub fn preview_or_placeholder<'a>(summary: &'a ConversationSummary, placeholder: &'a str) -> &'a str {
    if summary.has_history && !summary.preview.is_empty() {
        &summary.preview
    } else {
        placeholder
    }
}
