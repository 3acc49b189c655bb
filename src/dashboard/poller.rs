use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::shutdown::ShutdownSender;
use crate::store::MetricStore;
use crate::summary::{Summary, TimeWindow, summarize};

/// How often the dashboard re-reads the store.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Handle to a running poller. Dropping every receiver, or firing the
/// shutdown channel, stops the task and releases its timer.
#[derive(Debug)]
pub struct SummaryPoller {
    pub summaries: watch::Receiver<Summary>,
    pub handle: JoinHandle<()>,
}

/// Spawns a task that publishes a fresh [`Summary`] immediately and then on
/// every `interval` tick.
///
/// A failed store read is logged and that tick is skipped.
#[must_use]
pub fn spawn_summary_poller(
    store: Arc<MetricStore>,
    window: TimeWindow,
    interval: Duration,
    shutdown_tx: &ShutdownSender,
) -> SummaryPoller {
    let (summary_tx, summaries) = watch::channel(Summary::default());
    let mut shutdown_rx = shutdown_tx.subscribe();

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                () = summary_tx.closed() => break,
                _ = ticker.tick() => {
                    let records = match store.read_all() {
                        Ok(records) => records,
                        Err(err) => {
                            tracing::warn!("Dashboard failed to read metrics: {}", err);
                            continue;
                        }
                    };
                    let summary = summarize(&records, window, Utc::now());
                    if summary_tx.send(summary).is_err() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Summary poller stopped");
    });

    SummaryPoller { summaries, handle }
}
