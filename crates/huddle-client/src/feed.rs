//! Collaborator contracts consumed by the index runtime.

use std::sync::Arc;

use huddle_shared::SubscriptionId;
use huddle_store::IncomingMessage;

pub use huddle_store::HistoryFetcher;

/// Callback invoked by a feed for every pushed message.
pub type MessageCallback = Arc<dyn Fn(IncomingMessage) + Send + Sync>;

/// Publish/subscribe source of live messages.
pub trait MessageFeed: Send + Sync {
    /// Register `on_message`; it stays active until [`unsubscribe`](Self::unsubscribe).
    fn subscribe(&self, on_message: MessageCallback) -> SubscriptionId;

    /// Stop delivering to the subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}
