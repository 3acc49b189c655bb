use chrono::{DateTime, Utc};

use crate::metrics::MetricRecord;

use super::stats::{mean, percentile};
use super::types::{Summary, TimeWindow};

const P95: f64 = 95.0;

/// Records with `now - window <= timestamp <= now`, in store order.
#[must_use]
pub fn records_in_window(
    records: &[MetricRecord],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Vec<&MetricRecord> {
    let lower = now
        .checked_sub_signed(window.span())
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    records
        .iter()
        .filter(|record| record.timestamp >= lower && record.timestamp <= now)
        .collect()
}

/// Summarizes the records that fall inside `window` as of `now`.
///
/// Means and the 95th percentile are computed over the window. User and error
/// counters are taken verbatim from the latest record in the window; request
/// totals fall back to the window size and mean load time when the latest
/// record does not carry them.
#[must_use]
pub fn summarize(records: &[MetricRecord], window: TimeWindow, now: DateTime<Utc>) -> Summary {
    let filtered = records_in_window(records, window, now);
    let Some(latest) = filtered.last() else {
        return Summary::default();
    };

    let load_times: Vec<f64> = filtered
        .iter()
        .map(|record| record.performance.page_load_time)
        .collect();
    let render_times: Vec<f64> = filtered
        .iter()
        .map(|record| record.performance.render_time)
        .collect();
    let avg_load_time = mean(&load_times);

    let peak_users = latest.user.peak_users.unwrap_or_else(|| {
        filtered
            .iter()
            .map(|record| record.user.active_users.unwrap_or(0))
            .max()
            .unwrap_or(0)
    });
    let errors = latest.errors.unwrap_or_default();

    Summary {
        sample_count: filtered.len(),
        avg_load_time,
        avg_render_time: mean(&render_times),
        p95_load_time: percentile(&load_times, P95),
        total_users: latest.user.total_users.unwrap_or(0),
        active_users: latest.user.active_users.unwrap_or(0),
        peak_users,
        error_rate: errors.error_rate,
        error_count: errors.count,
        total_requests: latest
            .powerbi
            .total_requests
            .unwrap_or_else(|| u64::try_from(filtered.len()).unwrap_or(u64::MAX)),
        avg_response_time: latest.powerbi.avg_response_time.unwrap_or(avg_load_time),
    }
}
