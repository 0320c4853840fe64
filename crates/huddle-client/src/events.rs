use serde::Serialize;
use tokio::sync::mpsc;

use huddle_shared::UserId;

pub const EVENT_CONVERSATIONS_CHANGED: &str = "conversations-changed";
pub const EVENT_LOAD_COMPLETED: &str = "load-completed";
pub const EVENT_MESSAGE_REJECTED: &str = "message-rejected";
pub const EVENT_CONVERSATION_SELECTED: &str = "conversation-selected";

/// Notifications sent from the index task to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum IndexEvent {
    /// Summaries or order changed; re-query to redraw.
    #[serde(rename_all = "camelCase")]
    ConversationsChanged { conversations: usize, unread_total: usize },

    /// A roster-wide history load was applied.
    #[serde(rename_all = "camelCase")]
    LoadCompleted {
        generation: u64,
        applied: usize,
        discarded: usize,
    },

    /// A live message was refused.
    #[serde(rename_all = "camelCase")]
    MessageRejected { reason: String },

    /// The user opened a conversation. Hook for external read-marking.
    #[serde(rename_all = "camelCase")]
    ConversationSelected { user_id: UserId },
}

impl IndexEvent {
    pub fn name(&self) -> &'static str {
        match self {
            IndexEvent::ConversationsChanged { .. } => EVENT_CONVERSATIONS_CHANGED,
            IndexEvent::LoadCompleted { .. } => EVENT_LOAD_COMPLETED,
            IndexEvent::MessageRejected { .. } => EVENT_MESSAGE_REJECTED,
            IndexEvent::ConversationSelected { .. } => EVENT_CONVERSATION_SELECTED,
        }
    }
}

/// Forward `event` to the host without ever blocking the index task.
pub fn emit_event(tx: &mpsc::Sender<IndexEvent>, event: IndexEvent) {
    let name = event.name();
    if let Err(e) = tx.try_send(event) {
        tracing::error!(event = name, error = %e, "Failed to emit event");
    }
}
