//! Command execution for the CLI.
mod collect;
mod report;
mod sessions;
mod watch;


use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::args::{Command, PulseArgs};
use crate::error::AppResult;
use crate::metrics::MetricsCollector;
use crate::store::{self, KeyValueStore, MetricStore};

/// Opened durable state shared by every command.
pub(crate) struct Workspace {
    kv: Arc<dyn KeyValueStore>,
    store: Arc<MetricStore>,
    session_ttl: Duration,
}

impl Workspace {
    pub(crate) fn open(args: &PulseArgs) -> AppResult<Self> {
        let kv = store::open_store(args.backend, &PathBuf::from(&args.store_path))?;
        Ok(Self::from_parts(kv, args.capacity.get(), args.session_ttl))
    }

    pub(crate) fn from_parts(
        kv: Arc<dyn KeyValueStore>,
        capacity: usize,
        session_ttl: Duration,
    ) -> Self {
        let store = Arc::new(MetricStore::with_capacity(Arc::clone(&kv), capacity));
        Self {
            kv,
            store,
            session_ttl,
        }
    }

    fn collector(&self) -> MetricsCollector {
        MetricsCollector::new(Arc::clone(&self.kv), Arc::clone(&self.store))
            .with_session_ttl(self.session_ttl)
    }
}

pub(crate) async fn run_command(args: PulseArgs) -> AppResult<()> {
    let workspace = Workspace::open(&args)?;
    match args.command {
        Command::Collect(collect_args) => collect::run_collect(&workspace, &collect_args),
        Command::Interact(interact_args) => sessions::run_interact(&workspace, &interact_args),
        Command::Summary(summary_args) => report::run_summary(&workspace, &summary_args),
        Command::Export(export_args) => report::run_export(&workspace, &export_args).await,
        Command::Watch(watch_args) => watch::run_watch(&workspace, &watch_args).await,
        Command::Sessions => sessions::run_sessions(&workspace),
        Command::EndSession => sessions::run_end_session(&workspace),
        Command::Clear => {
            workspace.store.clear()?;
            tracing::info!("Cleared stored metrics");
            Ok(())
        }
    }
}
