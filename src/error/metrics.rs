use thiserror::Error;

use super::StoreError;

/// Failures while assembling a metric record. The collector never surfaces
/// these to its caller; they end up in the degraded record's `error` field.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("{field} must be a finite, non-negative number of milliseconds, got {value}.")]
    InvalidDuration { field: &'static str, value: f64 },
    #[error("Ambient probe failed reading {probe}: {source}")]
    Probe {
        probe: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to persist metric record: {source}")]
    Persist {
        #[source]
        source: StoreError,
    },
    #[error("Failed to refresh active sessions: {source}")]
    Sessions {
        #[source]
        source: StoreError,
    },
    #[error("Failed to read session bookkeeping: {source}")]
    Session {
        #[source]
        source: StoreError,
    },
}
