use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::store::ReportInteraction;

/// Visuals loading faster than this are `optimal`.
const OPTIMAL_LOAD_MS: f64 = 1000.0;
/// Visuals loading faster than this (and not optimal) are `fair`.
const FAIR_LOAD_MS: f64 = 2000.0;

/// One timestamped observation of a report load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub session_id: String,
    pub report_name: String,
    pub performance: PerformanceMetrics,
    #[serde(default)]
    pub system: SystemContext,
    #[serde(default)]
    pub powerbi: ReportMetrics,
    #[serde(default)]
    pub user: UserContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorStats>,
    /// Set only on degraded records returned after a collection failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MetricRecord {
    /// Minimal record returned when collection fails.
    #[must_use]
    pub fn degraded(
        report_name: &str,
        page_load_time: f64,
        render_time: f64,
        error: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            session_id: String::new(),
            report_name: report_name.to_owned(),
            performance: PerformanceMetrics {
                page_load_time,
                render_time,
                ..PerformanceMetrics::default()
            },
            system: SystemContext::default(),
            powerbi: ReportMetrics::default(),
            user: UserContext::default(),
            errors: None,
            error: Some(error),
        }
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub page_load_time: f64,
    pub render_time: f64,
    #[serde(default)]
    pub first_contentful_paint: Option<f64>,
    /// Active sessions at collection time.
    #[serde(default)]
    pub user_count: u64,
    #[serde(default)]
    pub dom_interactive: Option<f64>,
    #[serde(default)]
    pub resource_timing: Vec<ResourceTiming>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTiming {
    pub name: String,
    pub duration: f64,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(rename = "type")]
    pub initiator_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemContext {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub memory: MemoryUsage,
    #[serde(default)]
    pub connection: ConnectionInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkStats>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    #[serde(rename = "usedJSHeapSize", default)]
    pub used_bytes: Option<u64>,
    #[serde(rename = "totalJSHeapSize", default)]
    pub total_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    #[serde(rename = "type", default)]
    pub effective_type: Option<String>,
    #[serde(default)]
    pub downlink: Option<f64>,
    #[serde(default)]
    pub rtt: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub latency: f64,
    pub bandwidth: f64,
}

/// Report-level metrics, persisted under the `powerbi` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetrics {
    #[serde(default)]
    pub visible_report_elements: usize,
    #[serde(default)]
    pub report_interactions: InteractionSummary,
    #[serde(default)]
    pub data_refresh_time: f64,
    #[serde(default)]
    pub visual_load_times: Vec<VisualMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_requests: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_response_time: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionSummary {
    pub total_clicks: usize,
    #[serde(default)]
    pub last_interaction: Option<ReportInteraction>,
}

impl InteractionSummary {
    #[must_use]
    pub fn from_interactions(interactions: &[ReportInteraction]) -> Self {
        Self {
            total_clicks: interactions.len(),
            last_interaction: interactions.last().cloned(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthState {
    Authenticated,
    #[default]
    Anonymous,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    /// Persisted as `sessionId` for compatibility with existing stores.
    #[serde(rename = "sessionId", default)]
    pub auth_state: AuthState,
    #[serde(default)]
    pub session_duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_users: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_users: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_users: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStats {
    pub count: u64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualStatus {
    Optimal,
    Fair,
    Poor,
}

impl VisualStatus {
    /// Classifies a visual by load time. Non-finite input is `Poor`.
    #[must_use]
    pub fn from_load_time(load_time_ms: f64) -> Self {
        if load_time_ms < OPTIMAL_LOAD_MS {
            Self::Optimal
        } else if load_time_ms < FAIR_LOAD_MS {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

impl std::fmt::Display for VisualStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualUtilization {
    pub cpu: u8,
    pub memory: u8,
}

/// One widget inside a report. `status` is derived from `load_time` on every
/// read and write; any persisted status is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "VisualMetricWire", from = "VisualMetricWire")]
pub struct VisualMetric {
    pub visual_id: String,
    pub visual_type: String,
    pub title: String,
    pub load_time: f64,
    pub render_time: f64,
    pub data_size: u64,
    pub performance: VisualUtilization,
}

impl VisualMetric {
    #[must_use]
    pub fn status(&self) -> VisualStatus {
        VisualStatus::from_load_time(self.load_time)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisualMetricWire {
    visual_id: String,
    #[serde(default)]
    visual_type: String,
    #[serde(default)]
    title: String,
    load_time: f64,
    render_time: f64,
    #[serde(default)]
    data_size: u64,
    #[serde(default)]
    performance: VisualUtilization,
    #[serde(default, skip_deserializing)]
    status: Option<VisualStatus>,
}

impl From<VisualMetric> for VisualMetricWire {
    fn from(metric: VisualMetric) -> Self {
        let status = Some(metric.status());
        Self {
            visual_id: metric.visual_id,
            visual_type: metric.visual_type,
            title: metric.title,
            load_time: metric.load_time,
            render_time: metric.render_time,
            data_size: metric.data_size,
            performance: metric.performance,
            status,
        }
    }
}

impl From<VisualMetricWire> for VisualMetric {
    fn from(wire: VisualMetricWire) -> Self {
        Self {
            visual_id: wire.visual_id,
            visual_type: wire.visual_type,
            title: wire.title,
            load_time: wire.load_time,
            render_time: wire.render_time,
            data_size: wire.data_size,
            performance: wire.performance,
        }
    }
}

/// Identity of a visual as reported by the embedding page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualDescriptor {
    pub id: String,
    pub visual_type: String,
    pub title: String,
}

impl std::str::FromStr for VisualDescriptor {
    type Err = ValidationError;

    /// Parses `id:type:title`. The title may itself contain colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(id), Some(visual_type)) = (parts.next(), parts.next()) else {
            return Err(ValidationError::InvalidVisualFormat {
                value: s.to_owned(),
            });
        };
        let id = id.trim();
        if id.is_empty() {
            return Err(ValidationError::EmptyVisualId {
                value: s.to_owned(),
            });
        }
        Ok(Self {
            id: id.to_owned(),
            visual_type: visual_type.trim().to_owned(),
            title: parts.next().unwrap_or_default().trim().to_owned(),
        })
    }
}
