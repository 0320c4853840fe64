use huddle_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the index runtime handle.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The index task has stopped and no longer accepts commands.
    #[error("Conversation index is not running")]
    ChannelClosed,

    /// The index task dropped a reply before answering.
    #[error("Conversation index dropped the reply")]
    ReplyDropped,

    /// The index task panicked or was aborted.
    #[error("Conversation index task failed: {0}")]
    TaskFailed(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
