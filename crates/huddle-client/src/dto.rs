//! Display-ready rows handed to a UI host.

use serde::Serialize;

use crate::config::ClientConfig;
use crate::filter::ConversationEntry;
use crate::presentation::{initials, presence_label, preview_or_placeholder, unread_badge};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub id: String,
    pub full_name: String,
    pub profile_pic: Option<String>,
    pub initials: String,
    pub online: bool,
    pub presence: String,
    pub unread_count: usize,
    pub unread_badge: Option<String>,
    pub preview: String,
    pub last_message_at: Option<String>,
    pub has_history: bool,
}

impl ConversationDto {
    pub fn from_entry(entry: &ConversationEntry, config: &ClientConfig) -> Self {
        let summary = &entry.summary;
        Self {
            id: entry.user.id.to_string(),
            full_name: entry.user.full_name.clone(),
            profile_pic: entry.user.profile_pic.clone(),
            initials: initials(&entry.user.full_name),
            online: entry.online,
            presence: presence_label(entry.online).to_string(),
            unread_count: summary.unread_count,
            unread_badge: unread_badge(summary.unread_count, config.unread_badge_cap),
            preview: preview_or_placeholder(summary, &config.empty_preview_label).to_string(),
            last_message_at: summary.last_message_at.map(|t| t.to_rfc3339()),
            has_history: summary.has_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ConversationSummary;
    use chrono::{TimeZone, Utc};
    use huddle_store::User;

    #[test]
    fn test_dto_for_busy_conversation() {
        let user = User::new("u1", "Ada Lovelace");
        let mut summary = ConversationSummary::empty(user.id.clone());
        summary.unread_count = 120;
        summary.has_history = true;
        summary.preview = "see you".into();
        summary.last_message_at = Some(Utc.timestamp_opt(0, 0).unwrap());
        let entry = ConversationEntry {
            user,
            summary,
            online: true,
        };

        let dto = ConversationDto::from_entry(&entry, &ClientConfig::default());
        assert_eq!(dto.initials, "AL");
        assert_eq!(dto.unread_badge.as_deref(), Some("99+"));
        assert_eq!(dto.presence, "Online");
        assert_eq!(dto.preview, "see you");

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["fullName"], "Ada Lovelace");
        assert_eq!(json["lastMessageAt"], "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_dto_for_empty_conversation() {
        let user = User::new("u2", "Bo");
        let entry = ConversationEntry {
            summary: ConversationSummary::empty(user.id.clone()),
            user,
            online: false,
        };
        let dto = ConversationDto::from_entry(&entry, &ClientConfig::default());
        assert_eq!(dto.preview, "No messages yet");
        assert_eq!(dto.presence, "Offline");
        assert!(dto.unread_badge.is_none());
    }
}
