//! # huddle-store
//!
//! In-memory conversation history for the huddle client.
//!
//! The [`HistoryStore`] keeps, per counterpart, the ordered sequence of
//! messages exchanged with the current user. It is fed by a one-shot
//! [`bulk_load`] over a [`HistoryFetcher`] and by single live events, and
//! deduplicates by message id so that redelivery is harmless.

pub mod history;
pub mod loader;
pub mod messages;
pub mod models;

mod error;

pub use error::StoreError;
pub use history::HistoryStore;
pub use loader::{bulk_load, HistoryFetcher};
pub use messages::{resolve_counterpart, IngestOutcome};
pub use models::*;
