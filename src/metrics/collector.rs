use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::error::MetricsError;
use crate::store::{InteractionLog, KeyValueStore, MetricStore, SessionBook, SessionRegistry};

use super::ambient::{AmbientProbe, HostProbe};
use super::estimator::{SyntheticEstimator, VisualLoadEstimator};
use super::types::{
    AuthState, InteractionSummary, MetricRecord, PerformanceMetrics, ReportMetrics,
    SystemContext, UserContext, VisualDescriptor,
};

/// Assembles metric records and appends them to the bounded store.
///
/// `collect` never fails: any error while assembling or persisting a record
/// is logged and answered with a degraded record that is not stored.
pub struct MetricsCollector {
    kv: Arc<dyn KeyValueStore>,
    store: Arc<MetricStore>,
    registry: SessionRegistry,
    session: SessionBook,
    interactions: InteractionLog,
    probe: Arc<dyn AmbientProbe>,
    estimator: Arc<dyn VisualLoadEstimator>,
    started: Instant,
}

impl MetricsCollector {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, store: Arc<MetricStore>) -> Self {
        Self {
            store,
            registry: SessionRegistry::new(Arc::clone(&kv)),
            session: SessionBook::new(Arc::clone(&kv)),
            interactions: InteractionLog::new(Arc::clone(&kv)),
            kv,
            probe: Arc::new(HostProbe),
            estimator: Arc::new(SyntheticEstimator::new()),
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn AmbientProbe>) -> Self {
        self.probe = probe;
        self
    }

    #[must_use]
    pub fn with_estimator(mut self, estimator: Arc<dyn VisualLoadEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.registry = SessionRegistry::with_ttl(Arc::clone(&self.kv), ttl);
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<MetricStore> {
        &self.store
    }

    pub fn collect(
        &self,
        report_name: &str,
        page_load_time: f64,
        render_time: f64,
        visuals: Option<&[VisualDescriptor]>,
    ) -> MetricRecord {
        self.collect_at(report_name, page_load_time, render_time, visuals, Utc::now())
    }

    /// Same as [`MetricsCollector::collect`] with an explicit clock reading.
    pub fn collect_at(
        &self,
        report_name: &str,
        page_load_time: f64,
        render_time: f64,
        visuals: Option<&[VisualDescriptor]>,
        now: DateTime<Utc>,
    ) -> MetricRecord {
        match self.try_collect(report_name, page_load_time, render_time, visuals, now) {
            Ok(record) => record,
            Err(err) => {
                tracing::error!("Error collecting metrics for '{}': {}", report_name, err);
                MetricRecord::degraded(
                    report_name,
                    page_load_time,
                    render_time,
                    err.to_string(),
                    now,
                )
            }
        }
    }

    fn try_collect(
        &self,
        report_name: &str,
        page_load_time: f64,
        render_time: f64,
        visuals: Option<&[VisualDescriptor]>,
        now: DateTime<Utc>,
    ) -> Result<MetricRecord, MetricsError> {
        ensure_duration("pageLoadTime", page_load_time)?;
        ensure_duration("renderTime", render_time)?;

        let session_id = self
            .session
            .session_id()
            .map_err(|err| MetricsError::Session { source: err })?;

        let system = SystemContext {
            user_agent: self.probe.user_agent(),
            platform: self.probe.platform(),
            memory: self.probe.memory()?,
            connection: self.probe.connection()?,
            cpu: self.probe.cpu_percent()?,
            network: self.probe.network(),
        };

        let active_users = self
            .registry
            .active_count()
            .map_err(|err| MetricsError::Sessions { source: err })?;
        let active_users = u64::try_from(active_users).unwrap_or(u64::MAX);

        let interactions = self
            .interactions
            .read_all()
            .map_err(|err| MetricsError::Session { source: err })?;
        let authenticated = self
            .session
            .is_authenticated()
            .map_err(|err| MetricsError::Session { source: err })?;
        let session_duration = self
            .session
            .session_duration_ms(now)
            .map_err(|err| MetricsError::Session { source: err })?;

        let record = MetricRecord {
            timestamp: now,
            session_id,
            report_name: report_name.to_owned(),
            performance: PerformanceMetrics {
                page_load_time,
                render_time,
                first_contentful_paint: self.probe.first_contentful_paint(),
                user_count: active_users,
                dom_interactive: self.probe.dom_interactive(),
                resource_timing: self.probe.resource_timing(),
            },
            system,
            powerbi: ReportMetrics {
                visible_report_elements: visuals.map_or(0, <[VisualDescriptor]>::len),
                report_interactions: InteractionSummary::from_interactions(&interactions),
                data_refresh_time: elapsed_ms(self.started),
                visual_load_times: self.estimator.estimate(visuals),
                total_requests: None,
                avg_response_time: None,
            },
            user: UserContext {
                auth_state: if authenticated {
                    AuthState::Authenticated
                } else {
                    AuthState::Anonymous
                },
                session_duration,
                total_users: None,
                active_users: Some(active_users),
                peak_users: None,
            },
            errors: None,
            error: None,
        };

        self.store
            .append(&record)
            .map_err(|err| MetricsError::Persist { source: err })?;

        // The record is already stored; a registry failure only delays the
        // active-user count.
        if let Err(err) = self.registry.refresh(&record.session_id, now) {
            tracing::warn!("{}", MetricsError::Sessions { source: err });
        }

        tracing::debug!(
            "Collected metrics for '{}' (session {}, {} visuals)",
            record.report_name,
            record.session_id,
            record.powerbi.visual_load_times.len()
        );
        Ok(record)
    }
}

// Non-finite values serialize as `null` and would make the whole log unreadable.
fn ensure_duration(field: &'static str, value: f64) -> Result<(), MetricsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MetricsError::InvalidDuration { field, value })
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
