use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::args::WatchArgs;
use crate::dashboard::{DEFAULT_POLL_INTERVAL, spawn_summary_poller, summary_lines};
use crate::error::AppResult;
use crate::shutdown::{shutdown_channel, termination_signal};
use crate::store::MetricStore;
use crate::summary::{Summary, TimeWindow};

use super::Workspace;

pub(super) async fn run_watch(workspace: &Workspace, args: &WatchArgs) -> AppResult<()> {
    let window = args.window.unwrap_or_default();
    let interval = args.interval.unwrap_or(DEFAULT_POLL_INTERVAL);
    tracing::info!(
        "Watching metrics for the last {} every {}ms (Ctrl+C to stop)",
        window,
        interval.as_millis()
    );

    let mut stdout = std::io::stdout();
    watch_summaries(
        Arc::clone(&workspace.store),
        window,
        interval,
        termination_signal(),
        &mut stdout,
    )
    .await
}

/// Prints every published summary to `out` until `stop` resolves, then shuts
/// the poller down and waits for it.
pub(super) async fn watch_summaries<S, W>(
    store: Arc<MetricStore>,
    window: TimeWindow,
    interval: Duration,
    stop: S,
    out: &mut W,
) -> AppResult<()>
where
    S: Future<Output = ()>,
    W: Write,
{
    let (shutdown_tx, _shutdown_rx) = shutdown_channel();
    let mut poller = spawn_summary_poller(store, window, interval, &shutdown_tx);
    tokio::pin!(stop);

    let printed = loop {
        tokio::select! {
            () = &mut stop => {
                tracing::info!("Stopping watch");
                break Ok(());
            }
            changed = poller.summaries.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let summary = *poller.summaries.borrow_and_update();
                if let Err(err) = write_summary(out, &summary, window) {
                    break Err(err);
                }
            }
        }
    };

    drop(shutdown_tx.send(()));
    poller.handle.await?;
    printed?;
    Ok(())
}

fn write_summary<W: Write>(
    out: &mut W,
    summary: &Summary,
    window: TimeWindow,
) -> std::io::Result<()> {
    writeln!(out, "---")?;
    for line in summary_lines(summary, window) {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}
