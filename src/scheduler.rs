// Periodic cycle driver: {Stopped, Running} state machine on a
// background tokio task

use crate::assembler::Assembler;
use crate::publisher::Publisher;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, Instant, sleep_until};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerStatus {
    Stopped,
    Running,
}

struct Worker {
    handle: tokio::task::JoinHandle<()>,
    shutdown_tx: oneshot::Sender<()>,
    refresh_tx: mpsc::Sender<oneshot::Sender<()>>,
}

/// Drives collection cycles at the configured interval.
///
/// The first cycle fires immediately on `start()`; each subsequent
/// trigger is scheduled at `previous_cycle_start + interval`, so spacing
/// is measured from cycle start, not completion. A cycle that overruns
/// the interval defers the next trigger until it has published - cycles
/// never overlap. `stop()` is cooperative: the in-flight cycle finishes
/// and publishes, then the worker exits; it is bounded because every
/// probe is bounded by the assembler's per-probe timeout.
pub struct Scheduler {
    assembler: Arc<Assembler>,
    publisher: Arc<Publisher>,
    interval_secs: Arc<AtomicU64>,
    worker: Option<Worker>,
}

impl Scheduler {
    pub fn new(
        assembler: Arc<Assembler>,
        publisher: Arc<Publisher>,
        interval_seconds: u64,
    ) -> Self {
        Self {
            assembler,
            publisher,
            interval_secs: Arc::new(AtomicU64::new(interval_seconds.max(1))),
            worker: None,
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        if self.worker.is_some() {
            SchedulerStatus::Running
        } else {
            SchedulerStatus::Stopped
        }
    }

    /// New cycle period in seconds. While running this affects only
    /// future trigger spacing; the currently scheduled trigger keeps
    /// the old interval.
    pub fn set_interval(&self, seconds: u64) -> anyhow::Result<()> {
        anyhow::ensure!(seconds > 0, "interval must be > 0 seconds, got {seconds}");
        self.interval_secs.store(seconds, Ordering::Relaxed);
        Ok(())
    }

    /// Starts periodic collection. No-op when already running.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            tracing::debug!(operation = "start", "scheduler already running");
            return;
        }
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (refresh_tx, refresh_rx) = mpsc::channel(4);
        let handle = spawn_worker(
            self.assembler.clone(),
            self.publisher.clone(),
            self.interval_secs.clone(),
            shutdown_rx,
            refresh_rx,
        );
        self.worker = Some(Worker {
            handle,
            shutdown_tx,
            refresh_tx,
        });
        tracing::info!(
            interval_seconds = self.interval_secs.load(Ordering::Relaxed),
            "scheduler started"
        );
    }

    /// Stops periodic collection. The in-flight cycle (if any) completes
    /// and publishes before the worker exits. No-op when stopped.
    pub async fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            tracing::debug!(operation = "stop", "scheduler already stopped");
            return;
        };
        // Send can only fail if the worker already exited; join regardless.
        let _ = worker.shutdown_tx.send(());
        if let Err(e) = worker.handle.await {
            tracing::warn!(error = %e, operation = "stop", "scheduler worker join failed");
        }
        tracing::info!("scheduler stopped");
    }

    /// Runs one extra cycle now and completes once it has published.
    /// While running the request is queued behind any in-flight cycle
    /// (cycles still never overlap) and subsequent periodic triggers are
    /// measured from the refresh cycle's start. While stopped the cycle
    /// runs inline.
    pub async fn refresh_now(&self) {
        match &self.worker {
            Some(worker) => {
                let (ack_tx, ack_rx) = oneshot::channel();
                if worker.refresh_tx.send(ack_tx).await.is_ok() {
                    // Err means the worker exited mid-shutdown; nothing to wait for.
                    let _ = ack_rx.await;
                }
            }
            None => {
                let snapshot = self.assembler.collect().await;
                self.publisher.publish(snapshot);
            }
        }
    }
}

fn spawn_worker(
    assembler: Arc<Assembler>,
    publisher: Arc<Publisher>,
    interval_secs: Arc<AtomicU64>,
    mut shutdown_rx: oneshot::Receiver<()>,
    mut refresh_rx: mpsc::Receiver<oneshot::Sender<()>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut pending_acks: Vec<oneshot::Sender<()>> = Vec::new();
        loop {
            let cycle_start = Instant::now();
            let snapshot = assembler.collect().await;
            let outcomes = snapshot.outcome_summary();
            publisher.publish(snapshot);
            tracing::info!(
                duration_ms = cycle_start.elapsed().as_millis() as u64,
                outcomes = %outcomes,
                "cycle complete"
            );
            for ack in pending_acks.drain(..) {
                let _ = ack.send(());
            }

            // Interval is re-read here, so set_interval changes spacing
            // from the next trigger onward only. A deadline already in
            // the past (cycle overran the interval) fires immediately.
            let period = Duration::from_secs(interval_secs.load(Ordering::Relaxed));
            let next = cycle_start + period;
            // Biased: a shutdown that arrived during the cycle must win
            // over an already-elapsed trigger deadline.
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => {
                    tracing::debug!("scheduler worker shutting down");
                    break;
                }
                _ = sleep_until(next) => {}
                Some(ack) = refresh_rx.recv() => {
                    pending_acks.push(ack);
                }
            }
        }
    })
}
