//! Metric records, the visual load estimator, ambient probes, and the
//! collector that ties them to the bounded store.
mod ambient;
mod collector;
mod estimator;
mod types;

#[cfg(test)]
mod tests;

pub use ambient::{AmbientProbe, HostProbe};
pub use collector::MetricsCollector;
pub use estimator::{SyntheticEstimator, VisualLoadEstimator};
pub use types::{
    AuthState, ConnectionInfo, ErrorStats, InteractionSummary, MemoryUsage, MetricRecord,
    NetworkStats, PerformanceMetrics, ReportMetrics, ResourceTiming, SystemContext, UserContext,
    VisualDescriptor, VisualMetric, VisualStatus, VisualUtilization,
};
