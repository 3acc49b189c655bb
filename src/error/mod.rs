mod app;
mod config;
mod export;
mod metrics;
mod store;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use export::ExportError;
pub use metrics::MetricsError;
pub use store::StoreError;
pub use validation::ValidationError;
