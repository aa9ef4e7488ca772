// Latest-snapshot slot + load-average history ring + change notification

use crate::models::{LoadAvg, Snapshot};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

struct Slot {
    latest: Arc<Snapshot>,
    history: VecDeque<LoadAvg>,
}

/// Single-writer/many-reader holder of the most recent snapshot.
///
/// A snapshot is immutable behind an `Arc` and publication swaps the
/// whole `Arc` inside one short write-lock section, so readers always
/// see a complete cycle, never a half-updated one. Reads share the
/// lock and do not block each other. Before the first publish,
/// `latest()` returns `Snapshot::placeholder()`.
pub struct Publisher {
    slot: RwLock<Slot>,
    history_len: usize,
    tx: broadcast::Sender<Arc<Snapshot>>,
    published_total: AtomicU64,
}

impl Publisher {
    pub fn new(history_len: usize, broadcast_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(broadcast_capacity);
        Self {
            slot: RwLock::new(Slot {
                latest: Arc::new(Snapshot::placeholder()),
                history: VecDeque::with_capacity(history_len),
            }),
            history_len,
            tx,
            published_total: AtomicU64::new(0),
        }
    }

    /// Replaces the latest snapshot and appends its load-average triple
    /// to the chart history (successful readings only, oldest evicted
    /// first), then notifies subscribers. The write lock covers only
    /// the slot swap and one ring push.
    pub fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        {
            let mut slot = lock_write(&self.slot);
            slot.latest = snapshot.clone();
            if let Ok(load) = &snapshot.load_avg {
                if slot.history.len() == self.history_len {
                    slot.history.pop_front();
                }
                slot.history.push_back(*load);
            }
        }
        self.published_total.fetch_add(1, Ordering::Relaxed);
        if self.tx.send(snapshot).is_err() {
            tracing::debug!(
                operation = "notify_subscribers",
                "publish notification has no receivers"
            );
        }
    }

    /// Most recent snapshot; never blocks on an in-flight publish for
    /// more than the slot swap.
    pub fn latest(&self) -> Arc<Snapshot> {
        lock_read(&self.slot).latest.clone()
    }

    /// Up to `history_len` most recent load-average triples, oldest first.
    pub fn history(&self) -> Vec<LoadAvg> {
        lock_read(&self.slot).history.iter().copied().collect()
    }

    /// Change notification: one message per publish, carrying the
    /// published snapshot. Drive the presentation loop from this
    /// instead of ad hoc timers.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    /// Total snapshots published since construction.
    pub fn publish_count(&self) -> u64 {
        self.published_total.load(Ordering::Relaxed)
    }
}

// Lock poisoning only happens if a holder panicked; the slot is always
// left internally consistent, so recover the guard and continue.
fn lock_write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lock_read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}
