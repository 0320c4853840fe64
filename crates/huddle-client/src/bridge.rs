//! Runtime that drives a [`ConversationIndex`] from external triggers.
//!
//! A single tokio task owns the index. Host commands arrive on a bounded
//! mpsc channel, live messages on an unbounded one fed by the feed
//! subscription, and bulk-load results come back as commands from the
//! load task. Because one task consumes all of them, every mutation is
//! serialized without locks.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use huddle_shared::{SubscriptionId, UserId};
use huddle_store::{bulk_load, HistoryFetcher, IncomingMessage, Message, User};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::events::{emit_event, IndexEvent};
use crate::feed::{MessageCallback, MessageFeed};
use crate::filter::{FilterOptions, FilteredList};
use crate::index::ConversationIndex;
use crate::thread::ThreadEntry;

// ---------------------------------------------------------------------------
// Command types
// ---------------------------------------------------------------------------

/// Commands sent *into* the index task.
#[derive(Debug)]
pub enum IndexCommand {
    /// Replace the roster and start loading its history.
    SetRoster(Vec<User>),
    /// Replace the set of online users.
    SetPresence(Vec<UserId>),
    /// A message delivered outside the feed subscription.
    Incoming(IncomingMessage),
    /// Result of a bulk load started by `SetRoster`.
    LoadFinished {
        generation: u64,
        histories: HashMap<UserId, Vec<Message>>,
    },
    /// Open a conversation.
    Select(UserId),
    /// Snapshot of the filtered, ranked list.
    Query {
        options: FilterOptions,
        reply: oneshot::Sender<FilteredList>,
    },
    /// Thread view of one conversation.
    Thread {
        user: UserId,
        reply: oneshot::Sender<Vec<ThreadEntry>>,
    },
    /// Stop the task and hand the index back.
    Shutdown,
}

/// Host-side handle to a running index task.
pub struct IndexHandle {
    cmd_tx: mpsc::Sender<IndexCommand>,
    task: JoinHandle<ConversationIndex>,
}

/// Spawn the index task.
///
/// Subscribes to `feed` immediately; the subscription is released when the
/// task stops, either on [`IndexHandle::shutdown`] or once the handle is
/// dropped and no history load is in flight. Returns the handle and the
/// receiver of [`IndexEvent`]s.
///
/// The event channel holds `command_buffer` events. `LoadCompleted` waits for
/// room; any other event is dropped (and logged) while the channel is full,
/// so a host that drains slowly should re-query after the next event it sees.
pub fn spawn_index<F, M>(
    index: ConversationIndex,
    fetcher: Arc<F>,
    feed: Arc<M>,
) -> (IndexHandle, mpsc::Receiver<IndexEvent>)
where
    F: HistoryFetcher + ?Sized + 'static,
    M: MessageFeed + ?Sized + 'static,
{
    let buffer = index.config().command_buffer;
    let (cmd_tx, cmd_rx) = mpsc::channel::<IndexCommand>(buffer);
    let (event_tx, event_rx) = mpsc::channel::<IndexEvent>(buffer);
    let (live_tx, live_rx) = mpsc::unbounded_channel::<IncomingMessage>();

    let on_message: MessageCallback = Arc::new(move |raw: IncomingMessage| {
        if live_tx.send(raw).is_err() {
            debug!("Live message arrived after the index stopped");
        }
    });
    let subscription = feed.subscribe(on_message);
    info!(subscription = %subscription, "Subscribed to live message feed");

    let task = tokio::spawn(run_index(
        index,
        fetcher,
        feed,
        subscription,
        cmd_tx.downgrade(),
        cmd_rx,
        live_rx,
        event_tx,
    ));

    (IndexHandle { cmd_tx, task }, event_rx)
}

/// Convenience constructor reading [`ClientConfig::from_env`].
pub fn spawn_from_env<F, M>(
    current_user: UserId,
    fetcher: Arc<F>,
    feed: Arc<M>,
) -> (IndexHandle, mpsc::Receiver<IndexEvent>)
where
    F: HistoryFetcher + ?Sized + 'static,
    M: MessageFeed + ?Sized + 'static,
{
    let index = ConversationIndex::new(current_user, ClientConfig::from_env());
    spawn_index(index, fetcher, feed)
}

impl IndexHandle {
    async fn send(&self, cmd: IndexCommand) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| ClientError::ChannelClosed)
    }

    pub async fn set_roster(&self, users: Vec<User>) -> Result<()> {
        self.send(IndexCommand::SetRoster(users)).await
    }

    pub async fn set_presence(&self, online: Vec<UserId>) -> Result<()> {
        self.send(IndexCommand::SetPresence(online)).await
    }

    pub async fn ingest(&self, raw: IncomingMessage) -> Result<()> {
        self.send(IndexCommand::Incoming(raw)).await
    }

    pub async fn select(&self, user: UserId) -> Result<()> {
        self.send(IndexCommand::Select(user)).await
    }

    /// Current conversation list after every previously sent command.
    pub async fn ordered_conversations(&self, options: FilterOptions) -> Result<FilteredList> {
        let (reply, rx) = oneshot::channel();
        self.send(IndexCommand::Query { options, reply }).await?;
        rx.await.map_err(|_| ClientError::ReplyDropped)
    }

    pub async fn thread(&self, user: UserId) -> Result<Vec<ThreadEntry>> {
        let (reply, rx) = oneshot::channel();
        self.send(IndexCommand::Thread { user, reply }).await?;
        rx.await.map_err(|_| ClientError::ReplyDropped)
    }

    /// Stop the task, unsubscribe from the feed and return the index.
    pub async fn shutdown(self) -> Result<ConversationIndex> {
        // A closed channel means the task already ended; join it anyway.
        let _ = self.cmd_tx.send(IndexCommand::Shutdown).await;
        self.task
            .await
            .map_err(|e| ClientError::TaskFailed(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Task loop
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
async fn run_index<F, M>(
    mut index: ConversationIndex,
    fetcher: Arc<F>,
    feed: Arc<M>,
    subscription: SubscriptionId,
    load_tx: mpsc::WeakSender<IndexCommand>,
    mut cmd_rx: mpsc::Receiver<IndexCommand>,
    mut live_rx: mpsc::UnboundedReceiver<IncomingMessage>,
    events: mpsc::Sender<IndexEvent>,
) -> ConversationIndex
where
    F: HistoryFetcher + ?Sized + 'static,
    M: MessageFeed + ?Sized + 'static,
{
    info!(user = %index.current_user(), "Conversation index started");

    loop {
        // Live messages first: a feed event delivered before a query was
        // sent is always visible to that query.
        let cmd = tokio::select! {
            biased;
            Some(raw) = live_rx.recv() => IndexCommand::Incoming(raw),
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };

        match cmd {
            IndexCommand::SetRoster(users) => {
                let ticket = index.set_roster(users);
                notify_changed(&index, &events);
                // Upgrading only fails once every handle is gone.
                if let Some(tx) = load_tx.upgrade() {
                    spawn_load(
                        fetcher.clone(),
                        ticket.generation,
                        ticket.user_ids,
                        index.config().fetch_concurrency,
                        tx,
                    );
                }
            }

            IndexCommand::SetPresence(online) => {
                index.set_presence(online);
                notify_changed(&index, &events);
            }

            IndexCommand::Incoming(raw) => match index.ingest(raw) {
                Ok(outcome) if outcome.is_appended() => notify_changed(&index, &events),
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "Rejected live message");
                    emit_event(
                        &events,
                        IndexEvent::MessageRejected {
                            reason: e.to_string(),
                        },
                    );
                }
            },

            IndexCommand::LoadFinished {
                generation,
                histories,
            } => {
                let report = index.apply_load(generation, histories);
                let completed = IndexEvent::LoadCompleted {
                    generation,
                    applied: report.applied,
                    discarded: report.discarded,
                };
                if events.send(completed).await.is_err() {
                    debug!(generation, "Event receiver dropped before load completed");
                }
                notify_changed(&index, &events);
            }

            IndexCommand::Select(user) => {
                if index.select(&user) {
                    emit_event(&events, IndexEvent::ConversationSelected { user_id: user });
                }
            }

            IndexCommand::Query { options, reply } => {
                let _ = reply.send(index.filtered(&options));
            }

            IndexCommand::Thread { user, reply } => {
                let _ = reply.send(index.thread(&user));
            }

            IndexCommand::Shutdown => break,
        }
    }

    feed.unsubscribe(subscription);
    info!(subscription = %subscription, "Conversation index stopped");
    index
}

fn spawn_load<F>(
    fetcher: Arc<F>,
    generation: u64,
    user_ids: Vec<UserId>,
    concurrency: usize,
    cmd_tx: mpsc::Sender<IndexCommand>,
) where
    F: HistoryFetcher + ?Sized + 'static,
{
    tokio::spawn(async move {
        let histories = bulk_load(&*fetcher, &user_ids, concurrency).await;
        if cmd_tx
            .send(IndexCommand::LoadFinished {
                generation,
                histories,
            })
            .await
            .is_err()
        {
            debug!(generation, "Index stopped before history load finished");
        }
    });
}

fn notify_changed(index: &ConversationIndex, events: &mpsc::Sender<IndexEvent>) {
    emit_event(
        events,
        IndexEvent::ConversationsChanged {
            conversations: index.ranked().len(),
            unread_total: index.unread_total(),
        },
    );
}
