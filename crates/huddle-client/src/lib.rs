//! # huddle-client
//!
//! Conversation list engine for the huddle chat client.
//!
//! The [`ConversationIndex`] ingests a roster, bulk-loaded histories and a
//! live message stream, and keeps a deduplicated, deterministically ranked
//! conversation list. [`bridge::spawn_index`] runs it on a single tokio
//! task fed by external collaborators.

pub mod aggregator;
pub mod bridge;
pub mod config;
pub mod dto;
pub mod events;
pub mod feed;
pub mod filter;
pub mod index;
pub mod presentation;
pub mod ranker;
pub mod thread;

mod error;

use tracing_subscriber::{fmt, EnvFilter};

pub use aggregator::{ConversationRow, ConversationSummary};
pub use bridge::{spawn_from_env, spawn_index, IndexHandle};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use events::IndexEvent;
pub use feed::{HistoryFetcher, MessageCallback, MessageFeed};
pub use filter::{ConversationEntry, EmptyReason, FilterOptions, FilteredList};
pub use index::{ConversationIndex, LoadReport, LoadTicket};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("huddle_client=debug,huddle_store=info,warn")
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    tracing::info!("Starting {} conversation index", huddle_shared::constants::APP_NAME);
}
