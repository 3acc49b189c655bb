use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Trailing window used to filter records before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeWindow {
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    TwentyFourHours,
}

impl TimeWindow {
    pub const ALL: [Self; 3] = [Self::OneHour, Self::SixHours, Self::TwentyFourHours];

    #[must_use]
    pub const fn hours(self) -> i64 {
        match self {
            Self::OneHour => 1,
            Self::SixHours => 6,
            Self::TwentyFourHours => 24,
        }
    }

    #[must_use]
    pub fn span(self) -> chrono::Duration {
        chrono::Duration::hours(self.hours())
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::SixHours => "6h",
            Self::TwentyFourHours => "24h",
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeWindow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|window| window.as_str() == value)
            .ok_or_else(|| ValidationError::InvalidTimeWindow {
                value: s.to_owned(),
            })
    }
}

/// Dashboard headline numbers for one time window. All fields are zero when
/// the window holds no records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub sample_count: usize,
    pub avg_load_time: f64,
    pub avg_render_time: f64,
    pub p95_load_time: f64,
    pub total_users: u64,
    pub active_users: u64,
    pub peak_users: u64,
    pub error_rate: f64,
    pub error_count: u64,
    pub total_requests: u64,
    pub avg_response_time: f64,
}
