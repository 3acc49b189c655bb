use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use super::{
    AmbientProbe, AuthState, MemoryUsage, MetricsCollector, NetworkStats, SyntheticEstimator,
    VisualDescriptor, VisualLoadEstimator, VisualMetric, VisualStatus, VisualUtilization,
};
use crate::error::{MetricsError, StoreError};
use crate::store::{
    InteractionLog, KeyValueStore, METRICS_KEY, MemoryStore, MetricStore, SessionRegistry,
    USER_TOKEN_KEY,
};

const EPSILON: f64 = 1e-9;

struct FixedProbe;

impl AmbientProbe for FixedProbe {
    fn platform(&self) -> Option<String> {
        Some("test-os".to_owned())
    }

    fn memory(&self) -> Result<MemoryUsage, MetricsError> {
        Ok(MemoryUsage {
            used_bytes: Some(2048),
            total_bytes: Some(4096),
        })
    }

    fn cpu_percent(&self) -> Result<Option<f64>, MetricsError> {
        Ok(Some(12.0))
    }

    fn network(&self) -> Option<NetworkStats> {
        Some(NetworkStats {
            latency: 40.0,
            bandwidth: 10.0,
        })
    }
}

struct BrokenMemoryProbe;

impl AmbientProbe for BrokenMemoryProbe {
    fn memory(&self) -> Result<MemoryUsage, MetricsError> {
        Err(MetricsError::Probe {
            probe: "memory",
            source: std::io::Error::other("memory source unreadable"),
        })
    }
}

/// Accepts every write except to the metric log.
#[derive(Default)]
struct MetricsWriteFails {
    inner: MemoryStore,
}

impl KeyValueStore for MetricsWriteFails {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if key == METRICS_KEY {
            return Err(StoreError::Write {
                path: key.into(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}

fn at(secs: i64) -> Result<DateTime<Utc>, String> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| format!("invalid timestamp {}", secs))
}

fn descriptors() -> Result<Vec<VisualDescriptor>, String> {
    ["v1:barChart:Sales", "v2:card:Total: all regions", "v3:table:"]
        .iter()
        .map(|value| value.parse::<VisualDescriptor>().map_err(|err| err.to_string()))
        .collect()
}

fn collector_with(probe: Arc<dyn AmbientProbe>) -> (Arc<dyn KeyValueStore>, MetricsCollector) {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let store = Arc::new(MetricStore::new(Arc::clone(&kv)));
    let collector = MetricsCollector::new(Arc::clone(&kv), store)
        .with_probe(probe)
        .with_estimator(Arc::new(SyntheticEstimator::seeded(7)));
    (kv, collector)
}

#[test]
fn visual_status_thresholds() -> Result<(), String> {
    let cases = [
        (0.0, VisualStatus::Optimal),
        (999.9, VisualStatus::Optimal),
        (1000.0, VisualStatus::Fair),
        (1999.9, VisualStatus::Fair),
        (2000.0, VisualStatus::Poor),
        (f64::NAN, VisualStatus::Poor),
    ];
    for (load_time, expected) in cases {
        let status = VisualStatus::from_load_time(load_time);
        if status != expected {
            return Err(format!(
                "Load time {} classified as {}, expected {}",
                load_time, status, expected
            ));
        }
    }
    Ok(())
}

#[test]
fn visual_metric_status_is_derived_on_read() -> Result<(), String> {
    let json = r#"{
  "visualId": "v1",
  "visualType": "card",
  "title": "Total",
  "loadTime": 2500.0,
  "renderTime": 1750.0,
  "dataSize": 300,
  "performance": { "cpu": 10, "memory": 20 },
  "status": "optimal"
}"#;
    let metric: VisualMetric = serde_json::from_str(json).map_err(|err| err.to_string())?;
    if metric.status() != VisualStatus::Poor {
        return Err(format!("Unexpected status: {}", metric.status()));
    }
    let written = serde_json::to_value(&metric).map_err(|err| err.to_string())?;
    if written.get("status").and_then(serde_json::Value::as_str) != Some("poor") {
        return Err(format!("Unexpected written status: {}", written));
    }
    Ok(())
}

#[test]
fn visual_descriptor_parsing() -> Result<(), String> {
    let parsed = descriptors()?;
    let titles: Vec<&str> = parsed.iter().map(|visual| visual.title.as_str()).collect();
    if titles != ["Sales", "Total: all regions", ""] {
        return Err(format!("Unexpected titles: {:?}", titles));
    }

    for invalid in ["no-separator", ":card:Title"] {
        if invalid.parse::<VisualDescriptor>().is_ok() {
            return Err(format!("Expected '{}' to be rejected", invalid));
        }
    }
    Ok(())
}

#[test]
fn estimator_returns_nothing_without_visuals() -> Result<(), String> {
    let estimator = SyntheticEstimator::seeded(1);
    if !estimator.estimate(None).is_empty() {
        return Err("Expected no metrics for absent visuals".to_owned());
    }
    if !estimator.estimate(Some(&[])).is_empty() {
        return Err("Expected no metrics for empty visuals".to_owned());
    }
    Ok(())
}

#[test]
fn estimator_preserves_order_and_ranges() -> Result<(), String> {
    let visuals = descriptors()?;
    let metrics = SyntheticEstimator::seeded(42).estimate(Some(&visuals));

    let ids: Vec<&str> = metrics.iter().map(|metric| metric.visual_id.as_str()).collect();
    if ids != ["v1", "v2", "v3"] {
        return Err(format!("Unexpected order: {:?}", ids));
    }
    for metric in &metrics {
        if !(500.0..1500.0).contains(&metric.load_time) {
            return Err(format!("Load time out of range: {}", metric.load_time));
        }
        if (metric.render_time - metric.load_time * 0.7).abs() > EPSILON {
            return Err(format!("Unexpected render time: {}", metric.render_time));
        }
        if !(100..1100).contains(&metric.data_size) {
            return Err(format!("Data size out of range: {}", metric.data_size));
        }
        let VisualUtilization { cpu, memory } = metric.performance;
        if cpu > 100 || memory > 100 {
            return Err(format!("Utilization out of range: {} {}", cpu, memory));
        }
        if metric.status() == VisualStatus::Poor {
            return Err("Synthetic visuals never exceed the fair band".to_owned());
        }
    }
    Ok(())
}

#[test]
fn seeded_estimators_agree() -> Result<(), String> {
    let visuals = descriptors()?;
    let first = SyntheticEstimator::seeded(9).estimate(Some(&visuals));
    let second = SyntheticEstimator::seeded(9).estimate(Some(&visuals));
    if first != second {
        return Err("Expected identical output for identical seeds".to_owned());
    }
    Ok(())
}

#[test]
fn collect_assembles_and_stores_record() -> Result<(), String> {
    let (kv, collector) = collector_with(Arc::new(FixedProbe));
    kv.set(USER_TOKEN_KEY, "token").map_err(|err| err.to_string())?;
    InteractionLog::new(Arc::clone(&kv))
        .record("click", Some("v1"), at(99)?)
        .map_err(|err| err.to_string())?;
    let visuals = descriptors()?;

    let record = collector.collect_at("Sales Overview", 1200.0, 300.0, Some(&visuals), at(100)?);

    if record.is_degraded() {
        return Err(format!("Unexpected degraded record: {:?}", record.error));
    }
    let checks = [
        (record.report_name == "Sales Overview", "Unexpected report name"),
        (!record.session_id.is_empty(), "Expected a session id"),
        (
            (record.performance.page_load_time - 1200.0).abs() < EPSILON,
            "Unexpected page load time",
        ),
        (record.performance.user_count == 0, "Expected no prior sessions"),
        (
            record.system.memory.used_bytes == Some(2048),
            "Unexpected memory",
        ),
        (
            record.system.platform.as_deref() == Some("test-os"),
            "Unexpected platform",
        ),
        (record.system.network.is_some(), "Expected network stats"),
        (
            record.powerbi.visible_report_elements == 3,
            "Unexpected visible element count",
        ),
        (
            record.powerbi.visual_load_times.len() == 3,
            "Unexpected visual count",
        ),
        (
            record.powerbi.report_interactions.total_clicks == 1,
            "Unexpected interaction count",
        ),
        (
            record.user.auth_state == AuthState::Authenticated,
            "Expected authenticated user",
        ),
        (record.user.session_duration == 0, "Expected fresh session"),
        (record.user.active_users == Some(0), "Unexpected active users"),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(message.to_owned());
        }
    }

    let stored = collector.store().read_all().map_err(|err| err.to_string())?;
    match stored.last() {
        Some(last) if last.session_id == record.session_id && last.timestamp == record.timestamp => {}
        other => return Err(format!("Expected returned record to be stored: {:?}", other)),
    }
    let registry = SessionRegistry::new(Arc::clone(&kv));
    if registry.active_count().map_err(|err| err.to_string())? != 1 {
        return Err("Expected the session to be registered".to_owned());
    }
    Ok(())
}

#[test]
fn collect_counts_sessions_seen_before_this_one() -> Result<(), String> {
    let (kv, collector) = collector_with(Arc::new(FixedProbe));
    SessionRegistry::new(Arc::clone(&kv))
        .refresh("someone-else", at(95)?)
        .map_err(|err| err.to_string())?;

    let first = collector.collect_at("Report", 10.0, 5.0, None, at(100)?);
    let second = collector.collect_at("Report", 10.0, 5.0, None, at(101)?);

    if first.user.active_users != Some(1) {
        return Err(format!("Unexpected first count: {:?}", first.user.active_users));
    }
    if second.user.active_users != Some(2) {
        return Err(format!("Unexpected second count: {:?}", second.user.active_users));
    }
    if first.session_id != second.session_id {
        return Err("Expected one session across collections".to_owned());
    }
    if second.user.session_duration != 1_000 {
        return Err(format!("Unexpected duration: {}", second.user.session_duration));
    }
    Ok(())
}

#[test]
fn collect_without_visuals_records_none() -> Result<(), String> {
    let (_kv, collector) = collector_with(Arc::new(FixedProbe));
    let record = collector.collect_at("Report", 10.0, 5.0, None, at(100)?);
    if record.powerbi.visible_report_elements != 0 || !record.powerbi.visual_load_times.is_empty()
    {
        return Err("Expected no visuals".to_owned());
    }
    Ok(())
}

#[test]
fn collect_returns_degraded_record_when_probe_fails() -> Result<(), String> {
    let (kv, collector) = collector_with(Arc::new(BrokenMemoryProbe));
    let before = collector.store().len().map_err(|err| err.to_string())?;

    let record = collector.collect_at("Broken", 1500.0, 400.0, None, at(100)?);

    if !record.is_degraded() {
        return Err("Expected degraded record".to_owned());
    }
    let message = record.error.as_deref().unwrap_or_default();
    if !message.contains("memory") {
        return Err(format!("Unexpected error message: {}", message));
    }
    if record.report_name != "Broken" || (record.performance.render_time - 400.0).abs() > EPSILON
    {
        return Err("Expected caller inputs on degraded record".to_owned());
    }
    let after = collector.store().len().map_err(|err| err.to_string())?;
    if before != after {
        return Err(format!("Store changed from {} to {}", before, after));
    }
    let sessions = SessionRegistry::new(kv)
        .active_count()
        .map_err(|err| err.to_string())?;
    if sessions != 0 {
        return Err(format!("Expected untouched registry, got {} sessions", sessions));
    }
    Ok(())
}

#[test]
fn collect_returns_degraded_record_when_persist_fails() -> Result<(), String> {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MetricsWriteFails::default());
    let store = Arc::new(MetricStore::new(Arc::clone(&kv)));
    let collector = MetricsCollector::new(Arc::clone(&kv), store)
        .with_probe(Arc::new(FixedProbe))
        .with_estimator(Arc::new(SyntheticEstimator::seeded(7)));
    let registry = SessionRegistry::new(Arc::clone(&kv));
    registry
        .refresh("someone-else", at(95)?)
        .map_err(|err| err.to_string())?;

    let record = collector.collect_at("Report", 10.0, 5.0, None, at(100)?);

    let message = record.error.as_deref().unwrap_or_default();
    if !message.contains("persist") {
        return Err(format!("Expected persist failure, got {:?}", record.error));
    }
    let stored = collector.store().read_all().map_err(|err| err.to_string())?;
    if !stored.is_empty() {
        return Err(format!("Expected nothing stored, got {}", stored.len()));
    }
    let sessions = registry.active_count().map_err(|err| err.to_string())?;
    if sessions != 1 {
        return Err(format!("Expected registry left at 1 session, got {}", sessions));
    }
    Ok(())
}

#[test]
fn collect_rejects_non_finite_durations_without_touching_store() -> Result<(), String> {
    let (_kv, collector) = collector_with(Arc::new(FixedProbe));
    for secs in 0..5 {
        let record = collector.collect_at("Good", 100.0, 50.0, None, at(100 + secs)?);
        if record.is_degraded() {
            return Err(format!("Unexpected degraded record: {:?}", record.error));
        }
    }

    let invalid = [
        (f64::NAN, 50.0),
        (100.0, f64::INFINITY),
        (-1.0, 50.0),
        (100.0, f64::NEG_INFINITY),
    ];
    for (page_load, render) in invalid {
        let record = collector.collect_at("Bad", page_load, render, None, at(200)?);
        if !record.is_degraded() {
            return Err(format!("Expected degraded record for {} / {}", page_load, render));
        }
    }
    let after_bad = collector.store().len().map_err(|err| err.to_string())?;
    if after_bad != 5 {
        return Err(format!("Expected 5 stored records, got {}", after_bad));
    }

    collector.collect_at("Next", 100.0, 50.0, None, at(300)?);
    let names: Vec<String> = collector
        .store()
        .read_all()
        .map_err(|err| err.to_string())?
        .into_iter()
        .map(|record| record.report_name)
        .collect();
    if names.len() != 6 || names.last().map(String::as_str) != Some("Next") {
        return Err(format!("Unexpected stored reports: {:?}", names));
    }
    Ok(())
}

#[test]
fn degraded_record_serializes_error_field() -> Result<(), String> {
    let record = super::MetricRecord::degraded("Report", 1.0, 2.0, "boom".to_owned(), at(0)?);
    let value = serde_json::to_value(&record).map_err(|err| err.to_string())?;
    if value.get("error").and_then(serde_json::Value::as_str) != Some("boom") {
        return Err(format!("Unexpected degraded record: {}", value));
    }
    if value.get("errors").is_some() {
        return Err("Expected absent error stats to be skipped".to_owned());
    }
    Ok(())
}

#[test]
fn record_reads_camel_case_with_missing_blocks() -> Result<(), String> {
    let json = r#"{
  "timestamp": "2024-05-01T10:00:00.000Z",
  "sessionId": "abc123",
  "reportName": "Legacy",
  "performance": { "pageLoadTime": 900.0, "renderTime": 100.0 },
  "user": { "sessionId": "authenticated", "sessionDuration": 5 }
}"#;
    let record: super::MetricRecord = serde_json::from_str(json).map_err(|err| err.to_string())?;
    if record.user.auth_state != AuthState::Authenticated {
        return Err("Expected auth state from the user sessionId field".to_owned());
    }
    if !record.powerbi.visual_load_times.is_empty() || record.errors.is_some() {
        return Err("Expected defaults for missing blocks".to_owned());
    }
    Ok(())
}
