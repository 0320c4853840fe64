//! Per-counterpart message history.
//!
//! The [`HistoryStore`] is the single source of truth for what happened in
//! each conversation. Entries are created lazily, on the first fetch result
//! or the first live event for a counterpart.

use std::collections::{HashMap, HashSet};

use huddle_shared::{MessageId, UserId};

use crate::models::Message;

/// Ordered, deduplicated messages exchanged with one counterpart.
#[derive(Debug, Clone, Default)]
pub(crate) struct Conversation {
    pub(crate) messages: Vec<Message>,
    pub(crate) ids: HashSet<MessageId>,
}

impl Conversation {
    /// Append unless the id is already known. Returns whether it was added.
    pub(crate) fn push(&mut self, message: Message) -> bool {
        if !self.ids.insert(message.id.clone()) {
            return false;
        }
        self.messages.push(message);
        true
    }
}

/// Mapping from counterpart id to that conversation's message sequence.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    pub(crate) conversations: HashMap<UserId, Conversation>,
    revision: u64,
}

impl HistoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages exchanged with `user`, oldest first. Empty if unknown.
    pub fn get(&self, user: &UserId) -> &[Message] {
        self.conversations
            .get(user)
            .map(|c| c.messages.as_slice())
            .unwrap_or(&[])
    }

    /// Whether an entry exists for `user` (even an empty one).
    pub fn contains(&self, user: &UserId) -> bool {
        self.conversations.contains_key(user)
    }

    /// Number of messages held for `user`.
    pub fn len(&self, user: &UserId) -> usize {
        self.get(user).len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Counter bumped on every effective mutation. Two equal revisions mean
    /// identical contents.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drop every entry whose counterpart is not in `roster`.
    ///
    /// Returns the number of entries removed.
    pub fn retain_users(&mut self, roster: &HashSet<UserId>) -> usize {
        let before = self.conversations.len();
        self.conversations.retain(|id, _| roster.contains(id));
        let removed = before - self.conversations.len();
        if removed > 0 {
            self.bump();
            tracing::debug!(removed, "Pruned histories for users no longer in roster");
        }
        removed
    }

    pub(crate) fn entry(&mut self, user: UserId) -> &mut Conversation {
        self.conversations.entry(user).or_default()
    }

    pub(crate) fn bump(&mut self) {
        self.revision += 1;
    }
}
