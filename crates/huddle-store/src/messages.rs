use huddle_shared::UserId;
use tracing::{debug, trace};

use crate::error::{Result, StoreError};
use crate::history::{Conversation, HistoryStore};
use crate::models::{IncomingMessage, Message};

/// Result of handing one message to [`HistoryStore::ingest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The message was new and appended to the counterpart's history.
    Appended { counterpart: UserId },
    /// The id was already known; nothing changed.
    Duplicate { counterpart: UserId },
}

impl IngestOutcome {
    pub fn counterpart(&self) -> &UserId {
        match self {
            IngestOutcome::Appended { counterpart } | IngestOutcome::Duplicate { counterpart } => {
                counterpart
            }
        }
    }

    pub fn is_appended(&self) -> bool {
        matches!(self, IngestOutcome::Appended { .. })
    }
}

/// The party of `message` that is not `current`.
///
/// A message the current user sent to themself files under their own id.
/// A message where neither side is `current` belongs to someone else's
/// conversation and is refused.
pub fn resolve_counterpart(message: &Message, current: &UserId) -> Result<UserId> {
    if &message.sender_id == current {
        Ok(message.receiver_id.clone())
    } else if &message.receiver_id == current {
        Ok(message.sender_id.clone())
    } else {
        Err(StoreError::NotAParticipant {
            message_id: message.id.to_string(),
            user_id: current.to_string(),
        })
    }
}

impl HistoryStore {
    /// Append `message` to its counterpart's history unless its id is
    /// already there.
    pub fn ingest(&mut self, message: Message, current: &UserId) -> Result<IngestOutcome> {
        let counterpart = resolve_counterpart(&message, current)?;
        let id = message.id.clone();

        if self.entry(counterpart.clone()).push(message) {
            self.bump();
            trace!(message = %id, counterpart = %counterpart, "Appended message");
            Ok(IngestOutcome::Appended { counterpart })
        } else {
            debug!(message = %id, counterpart = %counterpart, "Dropped duplicate message");
            Ok(IngestOutcome::Duplicate { counterpart })
        }
    }

    /// Validate and ingest a raw message. Nothing is stored on error.
    pub fn ingest_incoming(
        &mut self,
        raw: IncomingMessage,
        current: &UserId,
    ) -> Result<IngestOutcome> {
        let message = Message::try_from(raw)?;
        self.ingest(message, current)
    }

    /// Merge a fetched history for `user` into the store.
    ///
    /// The result is the fetched sequence (deduplicated, fetch order)
    /// followed by any previously held messages the fetch did not return,
    /// so the outcome does not depend on whether live events landed before
    /// or after the fetch. A held message the fetch also returned takes its
    /// fetched position: held `[x, y]` merged with fetched `[y]` becomes
    /// `[y, x]`. Returns the number of messages that were new.
    pub fn merge_loaded(&mut self, user: &UserId, fetched: Vec<Message>) -> usize {
        let previous = self.conversations.remove(user).unwrap_or_default();

        let mut merged = Conversation::default();
        let mut added = 0;
        for message in fetched {
            let known = previous.ids.contains(&message.id);
            if merged.push(message) && !known {
                added += 1;
            }
        }
        for message in previous.messages {
            merged.push(message);
        }

        self.conversations.insert(user.clone(), merged);
        self.bump();
        debug!(user = %user, added, total = self.len(user), "Merged loaded history");
        added
    }
}
