//! # huddle-shared
//!
//! Identifiers, constants and error types shared by every huddle crate.

pub mod constants;
pub mod error;
pub mod types;

pub use error::FetchError;
pub use types::{MessageId, SubscriptionId, UserId};
