//! Roster-wide history loading.
//!
//! [`bulk_load`] fans out one fetch per user over a [`HistoryFetcher`] and
//! only returns once every fetch has settled. A failed fetch never fails the
//! load: that user simply gets an empty history.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use huddle_shared::{FetchError, UserId};

use crate::models::{IncomingMessage, Message};

/// Request/response access to the conversation history with one user.
#[async_trait]
pub trait HistoryFetcher: Send + Sync {
    /// Fetch every message exchanged between the current user and `user`,
    /// oldest first.
    async fn fetch_history(&self, user: &UserId) -> Result<Vec<IncomingMessage>, FetchError>;
}

/// Fetch the history of every user in `user_ids`.
///
/// At most `concurrency` fetches are in flight at once (`0` means no
/// limit). Records that fail validation are skipped; the rest of that
/// user's history is kept.
pub async fn bulk_load<F>(
    fetcher: &F,
    user_ids: &[UserId],
    concurrency: usize,
) -> HashMap<UserId, Vec<Message>>
where
    F: HistoryFetcher + ?Sized,
{
    let limit = if concurrency == 0 {
        user_ids.len().max(1)
    } else {
        concurrency
    };

    debug!(users = user_ids.len(), limit, "Starting bulk history load");

    let settled: Vec<(UserId, Result<Vec<IncomingMessage>, FetchError>)> =
        stream::iter(user_ids.iter().cloned())
            .map(|user| async move {
                let result = fetcher.fetch_history(&user).await;
                (user, result)
            })
            .buffer_unordered(limit)
            .collect()
            .await;

    let mut histories = HashMap::with_capacity(settled.len());
    let mut failures = 0usize;

    for (user, result) in settled {
        let messages = match result {
            Ok(records) => validate_records(&user, records),
            Err(e) => {
                failures += 1;
                warn!(user = %user, error = %e, "History fetch failed, showing empty conversation");
                Vec::new()
            }
        };
        histories.insert(user, messages);
    }

    info!(
        users = histories.len(),
        failures, "Bulk history load settled"
    );

    histories
}

fn validate_records(user: &UserId, records: Vec<IncomingMessage>) -> Vec<Message> {
    records
        .into_iter()
        .filter_map(|raw| match Message::try_from(raw) {
            Ok(m) => Some(m),
            Err(e) => {
                warn!(user = %user, error = %e, "Skipping malformed history record");
                None
            }
        })
        .collect()
}
