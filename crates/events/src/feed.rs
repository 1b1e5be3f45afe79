use std::sync::{Arc, RwLock};

use foundry_core::Checkpoint;
use futures::stream::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 1000;

/// Replay buffer plus live broadcast channel for one run.
///
/// `push` appends to the buffer and sends on the channel while holding the
/// write lock; `subscribe_with_history` snapshots the buffer and subscribes
/// while holding the read lock. Lock exclusivity guarantees a subscriber
/// sees every checkpoint exactly once across the replay/live boundary.
pub struct CheckpointFeed {
    run_id: Uuid,
    history: RwLock<Vec<Checkpoint>>,
    sender: broadcast::Sender<Checkpoint>,
}

impl CheckpointFeed {
    pub fn new(run_id: Uuid) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            run_id,
            history: RwLock::new(Vec::new()),
            sender,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Record a freshly committed checkpoint and fan it out to subscribers.
    pub fn push(&self, checkpoint: Checkpoint) {
        let mut history = self
            .history
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        history.push(checkpoint.clone());
        // Send while the lock is held so no subscriber can attach between
        // the buffer append and the broadcast.
        let _ = self.sender.send(checkpoint);
    }

    /// Backfill checkpoints persisted before this feed existed (process
    /// restart). Only sequence numbers below the current buffer head are
    /// inserted, so a concurrent `push` is never duplicated.
    pub fn seed_missing(&self, persisted: Vec<Checkpoint>) {
        let mut history = self
            .history
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match history.first() {
            None => *history = persisted,
            Some(head) => {
                let head_seq = head.sequence_number;
                let mut merged: Vec<Checkpoint> = persisted
                    .into_iter()
                    .take_while(|c| c.sequence_number < head_seq)
                    .collect();
                merged.append(&mut *history);
                *history = merged;
            }
        }
    }

    pub fn subscribe_with_history(&self) -> (Vec<Checkpoint>, broadcast::Receiver<Checkpoint>) {
        let history = self
            .history
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        (history.clone(), self.sender.subscribe())
    }

    /// Buffered checkpoints with a sequence number greater than `seq`.
    pub fn history_after(&self, seq: i64) -> Vec<Checkpoint> {
        self.history
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|c| c.sequence_number > seq)
            .cloned()
            .collect()
    }

    /// Replay everything after `after` (all of history when `None`), then
    /// follow live pushes in order. A lagged receiver is re-synced from the
    /// buffer instead of dropping checkpoints.
    pub fn replay_then_follow(
        self: Arc<Self>,
        after: Option<i64>,
    ) -> impl Stream<Item = Checkpoint> + Send + 'static {
        let (history, rx) = self.subscribe_with_history();
        let start = after.unwrap_or(-1);
        let replay: Vec<Checkpoint> = history
            .into_iter()
            .filter(|c| c.sequence_number > start)
            .collect();
        let last_seen = replay.last().map(|c| c.sequence_number).unwrap_or(start);

        let feed = self;
        let live = BroadcastStream::new(rx)
            .scan(last_seen, move |last, result| {
                let batch: Vec<Checkpoint> = match result {
                    Ok(cp) if cp.sequence_number > *last => vec![cp],
                    Ok(_) => Vec::new(),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            run_id = %feed.run_id,
                            skipped,
                            "subscriber lagged, re-syncing from feed buffer"
                        );
                        feed.history_after(*last)
                    }
                };
                if let Some(tail) = batch.last() {
                    *last = tail.sequence_number;
                }
                futures::future::ready(Some(batch))
            })
            .flat_map(futures::stream::iter);

        futures::stream::iter(replay).chain(live)
    }

    pub fn len(&self) -> usize {
        self.history
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl std::fmt::Debug for CheckpointFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckpointFeed")
            .field("run_id", &self.run_id)
            .field("buffered", &self.len())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
