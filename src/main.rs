mod app;
mod args;
mod config;
mod dashboard;
mod entry;
mod error;
mod export;
mod logger;
mod metrics;
mod shutdown;
mod store;
mod summary;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
