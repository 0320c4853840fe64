use thiserror::Error;

/// Failure of a single history fetch. Always recovered per user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Unknown user: {0}")]
    UnknownUser(String),
}
