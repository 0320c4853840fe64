use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A required field was absent or empty on an incoming message.
    #[error("Malformed message: missing `{field}`")]
    MalformedMessage { field: &'static str },

    /// Neither party of the message is the current user.
    #[error("Message {message_id} does not involve user {user_id}")]
    NotAParticipant { message_id: String, user_id: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
