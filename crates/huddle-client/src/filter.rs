//! Search / online-only narrowing of the ranked list.
//!
//! Filtering only removes rows; survivors keep their ranked order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use huddle_shared::UserId;
use huddle_store::User;

use crate::aggregator::{ConversationRow, ConversationSummary};

/// Options a UI passes when asking for the conversation list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOptions {
    /// Case-insensitive substring of the display name. Empty matches all.
    pub search_text: String,
    /// Hide users that are not currently online.
    pub online_only: bool,
}

impl FilterOptions {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search_text: text.into(),
            online_only: false,
        }
    }

    pub fn online_only() -> Self {
        Self {
            search_text: String::new(),
            online_only: true,
        }
    }
}

/// A ranked row plus the presence of its user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEntry {
    pub user: User,
    pub summary: ConversationSummary,
    pub online: bool,
}

/// Why a filtered list came out empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyReason {
    /// A search was active and nothing matched.
    NoMatches,
    /// Only online users were requested and none are.
    NoneOnline,
    /// The roster itself is empty.
    NoConversations,
}

impl EmptyReason {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::NoMatches => "No users found",
            EmptyReason::NoneOnline => "No online users",
            EmptyReason::NoConversations => "No conversations",
        }
    }
}

/// Result of [`apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredList {
    pub entries: Vec<ConversationEntry>,
    pub empty_reason: Option<EmptyReason>,
}

impl FilteredList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether `user` passes `options`.
pub fn matches(user: &User, online: bool, options: &FilterOptions) -> bool {
    let matches_search = options.search_text.is_empty()
        || user
            .full_name
            .to_lowercase()
            .contains(&options.search_text.to_lowercase());
    matches_search && (!options.online_only || online)
}

/// Narrow `ranked` according to `options`.
pub fn apply(
    ranked: &[ConversationRow],
    presence: &HashSet<UserId>,
    options: &FilterOptions,
) -> FilteredList {
    let entries: Vec<ConversationEntry> = ranked
        .iter()
        .filter_map(|row| {
            let online = presence.contains(&row.user.id);
            matches(&row.user, online, options).then(|| ConversationEntry {
                user: row.user.clone(),
                summary: row.summary.clone(),
                online,
            })
        })
        .collect();

    let empty_reason = if !entries.is_empty() {
        None
    } else if !options.search_text.is_empty() {
        Some(EmptyReason::NoMatches)
    } else if options.online_only {
        Some(EmptyReason::NoneOnline)
    } else {
        Some(EmptyReason::NoConversations)
    };

    FilteredList {
        entries,
        empty_reason,
    }
}
