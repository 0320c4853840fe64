//! The conversation index.
//!
//! [`ConversationIndex`] exclusively owns the [`HistoryStore`] and keeps a
//! ranked list of conversation rows in sync with it. Every mutating call
//! ends with [`ConversationIndex::refresh`], which re-derives summaries and
//! order only when the history or the roster actually changed.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use huddle_shared::UserId;
use huddle_store::{
    bulk_load, HistoryFetcher, HistoryStore, IncomingMessage, IngestOutcome, Message, User,
};

use crate::aggregator::{summarize_roster, ConversationRow, ConversationSummary};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::filter::{self, ConversationEntry, FilterOptions, FilteredList};
use crate::ranker;
use crate::thread::{build_thread, ThreadEntry};

/// Identifies the roster a bulk load was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub user_ids: Vec<UserId>,
}

/// What happened when a bulk-load result was applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Users whose fetched history was merged.
    pub applied: usize,
    /// Users dropped because they left the roster while loading.
    pub discarded: usize,
}

/// Conversation list state for one signed-in user.
pub struct ConversationIndex {
    current_user: UserId,
    config: ClientConfig,

    roster: Vec<User>,
    roster_ids: HashSet<UserId>,
    roster_revision: u64,
    load_generation: u64,

    history: HistoryStore,
    presence: HashSet<UserId>,
    selected: Option<UserId>,

    ranked: Vec<ConversationRow>,
    /// `(history revision, roster revision)` the ranked list was built from.
    ranked_key: Option<(u64, u64)>,
}

impl ConversationIndex {
    /// Create an empty index for `current_user`.
    pub fn new(current_user: UserId, config: ClientConfig) -> Self {
        let mut index = Self {
            current_user,
            config,
            roster: Vec::new(),
            roster_ids: HashSet::new(),
            roster_revision: 0,
            load_generation: 0,
            history: HistoryStore::new(),
            presence: HashSet::new(),
            selected: None,
            ranked: Vec::new(),
            ranked_key: None,
        };
        index.refresh();
        index
    }

    pub fn current_user(&self) -> &UserId {
        &self.current_user
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Roster
    // -----------------------------------------------------------------------

    /// Replace the roster.
    ///
    /// Duplicate ids keep their first occurrence. Histories and the
    /// selection of users who left are dropped. The returned ticket names
    /// the users a fresh bulk load should fetch.
    pub fn set_roster(&mut self, users: Vec<User>) -> LoadTicket {
        let mut seen = HashSet::with_capacity(users.len());
        let roster: Vec<User> = users
            .into_iter()
            .filter(|u| {
                if u.id.is_empty() {
                    warn!("Ignoring roster entry without an id");
                    return false;
                }
                seen.insert(u.id.clone())
            })
            .collect();

        self.roster_ids = seen;
        self.roster = roster;
        self.roster_revision += 1;
        self.load_generation += 1;

        self.history.retain_users(&self.roster_ids);
        if let Some(selected) = &self.selected {
            if !self.roster_ids.contains(selected) {
                debug!(user = %selected, "Selected user left the roster");
                self.selected = None;
            }
        }

        info!(
            users = self.roster.len(),
            generation = self.load_generation,
            "Roster replaced"
        );
        self.refresh();

        LoadTicket {
            generation: self.load_generation,
            user_ids: self.roster.iter().map(|u| u.id.clone()).collect(),
        }
    }

    pub fn roster(&self) -> &[User] {
        &self.roster
    }

    /// Generation of the most recent roster.
    pub fn load_generation(&self) -> u64 {
        self.load_generation
    }

    /// Merge the result of a bulk load.
    ///
    /// Users no longer in the roster are discarded, whatever generation the
    /// load belonged to, so stale results can never resurrect them.
    pub fn apply_load(
        &mut self,
        generation: u64,
        histories: HashMap<UserId, Vec<Message>>,
    ) -> LoadReport {
        if generation != self.load_generation {
            debug!(
                generation,
                current = self.load_generation,
                "Applying load from an earlier roster"
            );
        }

        let mut report = LoadReport::default();
        for (user, messages) in histories {
            if !self.roster_ids.contains(&user) {
                debug!(user = %user, "Discarding history for user no longer in roster");
                report.discarded += 1;
                continue;
            }
            self.history.merge_loaded(&user, messages);
            report.applied += 1;
        }

        info!(
            generation,
            applied = report.applied,
            discarded = report.discarded,
            "Applied bulk history load"
        );
        self.refresh();
        report
    }

    /// Fetch the whole roster's history and apply it.
    ///
    /// Holds `&mut self` across the fetches, so live events cannot be
    /// ingested meanwhile; hosts that need that use [`crate::bridge`].
    pub async fn load<F>(&mut self, fetcher: &F) -> LoadReport
    where
        F: HistoryFetcher + ?Sized,
    {
        let generation = self.load_generation;
        let ids: Vec<UserId> = self.roster.iter().map(|u| u.id.clone()).collect();
        let histories = bulk_load(fetcher, &ids, self.config.fetch_concurrency).await;
        self.apply_load(generation, histories)
    }

    // -----------------------------------------------------------------------
    // Live events
    // -----------------------------------------------------------------------

    /// Ingest a message pushed by the live feed.
    pub fn ingest(&mut self, raw: IncomingMessage) -> Result<IngestOutcome> {
        let outcome = self.history.ingest_incoming(raw, &self.current_user)?;
        self.refresh();
        Ok(outcome)
    }

    pub fn history(&self, user: &UserId) -> &[Message] {
        self.history.get(user)
    }

    pub fn store(&self) -> &HistoryStore {
        &self.history
    }

    // -----------------------------------------------------------------------
    // Presence
    // -----------------------------------------------------------------------

    /// Replace the set of online users.
    pub fn set_presence<I>(&mut self, online: I)
    where
        I: IntoIterator<Item = UserId>,
    {
        self.presence = online.into_iter().collect();
        debug!(online = self.presence.len(), "Presence updated");
    }

    pub fn is_online(&self, id: &UserId) -> bool {
        self.presence.contains(id)
    }

    /// Online users other than the current user.
    pub fn online_count(&self) -> usize {
        self.presence
            .iter()
            .filter(|id| **id != self.current_user)
            .count()
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Select the conversation with `user`. Returns `false` for users not in
    /// the roster. Read flags are left alone.
    pub fn select(&mut self, user: &UserId) -> bool {
        if !self.roster_ids.contains(user) {
            warn!(user = %user, "Cannot select user outside the roster");
            return false;
        }
        self.selected = Some(user.clone());
        true
    }

    pub fn selected(&self) -> Option<&UserId> {
        self.selected.as_ref()
    }

    /// Thread view of the conversation with `user`.
    pub fn thread(&self, user: &UserId) -> Vec<ThreadEntry> {
        build_thread(self.history.get(user), &self.current_user)
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    /// Rebuild summaries and order if the history or roster changed since
    /// the last build. Returns whether anything was recomputed.
    pub fn refresh(&mut self) -> bool {
        let key = (self.history.revision(), self.roster_revision);
        if self.ranked_key == Some(key) {
            return false;
        }

        let rows = summarize_roster(
            &self.history,
            &self.roster,
            &self.current_user,
            &self.config.image_preview_label,
        );
        self.ranked = ranker::rank(rows);
        self.ranked_key = Some(key);
        true
    }

    /// All roster rows in display order.
    pub fn ranked(&self) -> &[ConversationRow] {
        &self.ranked
    }

    pub fn summary(&self, user: &UserId) -> Option<&ConversationSummary> {
        self.ranked
            .iter()
            .find(|row| &row.user.id == user)
            .map(|row| &row.summary)
    }

    /// Total unread messages across the roster.
    pub fn unread_total(&self) -> usize {
        self.ranked.iter().map(|r| r.summary.unread_count).sum()
    }

    /// Ranked conversations narrowed by `options`.
    pub fn ordered_conversations(&self, options: &FilterOptions) -> Vec<ConversationEntry> {
        self.filtered(options).entries
    }

    /// Like [`ordered_conversations`](Self::ordered_conversations), with
    /// the reason an empty result is empty.
    pub fn filtered(&self, options: &FilterOptions) -> FilteredList {
        filter::apply(&self.ranked, &self.presence, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use huddle_shared::FetchError;
    use huddle_store::StoreError;

    use crate::error::ClientError;

    fn me() -> UserId {
        UserId::new("me")
    }

    fn raw(id: &str, from: &str, to: &str, t: i64, read: bool) -> IncomingMessage {
        IncomingMessage {
            id: Some(id.into()),
            sender_id: Some(from.into()),
            receiver_id: Some(to.into()),
            text: Some(format!("text {id}")),
            image: None,
            created_at: Some(Utc.timestamp_opt(t, 0).unwrap()),
            read,
        }
    }

    fn msg(id: &str, from: &str, to: &str, t: i64, read: bool) -> Message {
        Message::try_from(raw(id, from, to, t, read)).unwrap()
    }

    fn index_with(users: &[(&str, &str)]) -> ConversationIndex {
        let mut index = ConversationIndex::new(me(), ClientConfig::default());
        index.set_roster(users.iter().map(|(id, n)| User::new(*id, *n)).collect());
        index
    }

    fn order(index: &ConversationIndex) -> Vec<String> {
        index
            .ordered_conversations(&FilterOptions::default())
            .into_iter()
            .map(|e| e.user.full_name)
            .collect()
    }

    #[test]
    fn test_unread_priority_beats_later_timestamp() {
        let mut index = index_with(&[("1", "Alice"), ("2", "Bob")]);
        index.ingest(raw("a", "1", "me", 10, false)).unwrap();
        index.ingest(raw("b", "2", "me", 20, true)).unwrap();
        assert_eq!(order(&index), vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_users_without_messages_fall_back_to_name() {
        let index = index_with(&[("2", "zoe"), ("1", "Adam")]);
        assert_eq!(order(&index), vec!["Adam", "zoe"]);
    }

    #[test]
    fn test_redelivery_leaves_history_unchanged() {
        let mut index = index_with(&[("1", "Alice")]);
        index.ingest(raw("a", "1", "me", 10, false)).unwrap();
        let outcome = index.ingest(raw("a", "1", "me", 10, false)).unwrap();
        assert!(!outcome.is_appended());
        assert_eq!(index.history(&UserId::new("1")).len(), 1);
        assert_eq!(index.summary(&UserId::new("1")).unwrap().unread_count, 1);
    }

    #[test]
    fn test_online_only_filter_keeps_relative_order() {
        let mut index = index_with(&[("1", "Alice"), ("2", "Bob"), ("3", "Cara")]);
        index.set_presence([UserId::new("1"), UserId::new("3")]);
        let names: Vec<String> = index
            .ordered_conversations(&FilterOptions::online_only())
            .into_iter()
            .map(|e| e.user.full_name)
            .collect();
        assert_eq!(names, vec!["Alice", "Cara"]);
    }

    #[test]
    fn test_malformed_message_is_rejected() {
        let mut index = index_with(&[("1", "Alice")]);
        let mut bad = raw("a", "1", "me", 10, false);
        bad.id = None;
        let err = index.ingest(bad).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Store(StoreError::MalformedMessage { field: "id" })
        ));
        assert!(index.history(&UserId::new("1")).is_empty());
    }

    #[test]
    fn test_refresh_is_memoized() {
        let mut index = index_with(&[("1", "Alice")]);
        assert!(!index.refresh());
        index.ingest(raw("a", "1", "me", 10, false)).unwrap();
        assert!(!index.refresh());
        index.set_presence([UserId::new("1")]);
        assert!(!index.refresh());
    }

    #[test]
    fn test_stale_load_for_removed_user_is_discarded() {
        let mut index = index_with(&[("1", "Alice"), ("2", "Bob")]);
        let old = index.load_generation();
        index.set_roster(vec![User::new("1", "Alice")]);

        let mut histories = HashMap::new();
        histories.insert(UserId::new("1"), vec![msg("a", "1", "me", 1, false)]);
        histories.insert(UserId::new("2"), vec![msg("b", "2", "me", 2, false)]);
        let report = index.apply_load(old, histories);

        assert_eq!(report, LoadReport { applied: 1, discarded: 1 });
        assert!(!index.store().contains(&UserId::new("2")));
        assert_eq!(index.ranked().len(), 1);
    }

    #[test]
    fn test_convergence_regardless_of_interleaving() {
        let fetched = vec![
            msg("a", "1", "me", 1, true),
            msg("b", "me", "1", 2, false),
            msg("c", "1", "me", 3, false),
        ];

        let mut live_first = index_with(&[("1", "Alice")]);
        live_first.ingest(raw("c", "1", "me", 3, false)).unwrap();
        let mut histories = HashMap::new();
        histories.insert(UserId::new("1"), fetched.clone());
        live_first.apply_load(live_first.load_generation(), histories.clone());

        let mut load_first = index_with(&[("1", "Alice")]);
        load_first.apply_load(load_first.load_generation(), histories);
        load_first.ingest(raw("c", "1", "me", 3, false)).unwrap();

        assert_eq!(live_first.ranked(), load_first.ranked());
        let summary = live_first.summary(&UserId::new("1")).unwrap();
        assert_eq!(summary.unread_count, 1);
        assert_eq!(summary.last_message.as_ref().unwrap().id.as_str(), "c");
    }

    #[test]
    fn test_unread_grows_only_with_new_counterpart_messages() {
        let mut index = index_with(&[("1", "Alice")]);
        let unread = |i: &ConversationIndex| i.summary(&UserId::new("1")).unwrap().unread_count;

        index.ingest(raw("a", "1", "me", 1, false)).unwrap();
        assert_eq!(unread(&index), 1);
        index.ingest(raw("b", "me", "1", 2, false)).unwrap();
        assert_eq!(unread(&index), 1);
        index.ingest(raw("c", "1", "me", 3, true)).unwrap();
        assert_eq!(unread(&index), 1);
        index.ingest(raw("d", "1", "me", 4, false)).unwrap();
        assert_eq!(unread(&index), 2);
        assert_eq!(index.unread_total(), 2);
    }

    #[test]
    fn test_roster_replacement_drops_selection_and_history() {
        let mut index = index_with(&[("1", "Alice"), ("2", "Bob")]);
        index.ingest(raw("b", "2", "me", 1, false)).unwrap();
        assert!(index.select(&UserId::new("2")));

        index.set_roster(vec![User::new("1", "Alice"), User::new("1", "Alice again")]);
        assert_eq!(index.roster().len(), 1);
        assert!(index.selected().is_none());
        assert!(index.history(&UserId::new("2")).is_empty());
        assert!(!index.select(&UserId::new("2")));
    }

    #[test]
    fn test_online_count_excludes_current_user() {
        let mut index = index_with(&[("1", "Alice")]);
        index.set_presence([me(), UserId::new("1"), UserId::new("9")]);
        assert_eq!(index.online_count(), 2);
        assert!(index.is_online(&UserId::new("1")));
    }

    struct CannedFetcher;

    #[async_trait]
    impl HistoryFetcher for CannedFetcher {
        async fn fetch_history(
            &self,
            user: &UserId,
        ) -> std::result::Result<Vec<IncomingMessage>, FetchError> {
            match user.as_str() {
                "1" => Ok(vec![raw("a", "1", "me", 10, false), raw("b", "me", "1", 11, true)]),
                _ => Err(FetchError::Timeout),
            }
        }
    }

    #[tokio::test]
    async fn test_load_isolates_failed_fetch() {
        let mut index = index_with(&[("1", "Alice"), ("2", "Bob")]);
        let report = index.load(&CannedFetcher).await;

        assert_eq!(report, LoadReport { applied: 2, discarded: 0 });
        let alice = index.summary(&UserId::new("1")).unwrap();
        assert_eq!(alice.unread_count, 1);
        assert_eq!(alice.last_message.as_ref().unwrap().id.as_str(), "b");

        let bob = index.summary(&UserId::new("2")).unwrap();
        assert!(!bob.has_history);
        assert!(index.store().contains(&UserId::new("2")));
        assert_eq!(order(&index), vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn test_load_keeps_earlier_live_messages() {
        let mut index = index_with(&[("1", "Alice")]);
        index.ingest(raw("live", "1", "me", 20, false)).unwrap();
        index.load(&CannedFetcher).await;

        let ids: Vec<&str> = index
            .history(&UserId::new("1"))
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "live"]);
        assert_eq!(index.summary(&UserId::new("1")).unwrap().unread_count, 2);
    }

    #[test]
    fn test_thread_follows_history() {
        let mut index = index_with(&[("1", "Alice")]);
        index.ingest(raw("a", "1", "me", 1, false)).unwrap();
        index.ingest(raw("b", "me", "1", 2, false)).unwrap();
        let thread = index.thread(&UserId::new("1"));
        assert_eq!(thread.len(), 2);
        assert!(!thread[0].is_own);
        assert!(thread[1].is_own);
    }
}
