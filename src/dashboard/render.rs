use crate::metrics::MetricRecord;
use crate::summary::{Summary, TimeWindow};

pub fn summary_lines(summary: &Summary, window: TimeWindow) -> Vec<String> {
    vec![
        format!("Window: last {} ({} samples)", window, summary.sample_count),
        format!("Avg Load Time: {:.0}ms", summary.avg_load_time),
        format!("Avg Render Time: {:.0}ms", summary.avg_render_time),
        format!("P95 Load Time: {:.0}ms", summary.p95_load_time),
        format!(
            "Users: {} active / {} peak / {} total",
            summary.active_users, summary.peak_users, summary.total_users
        ),
        format!(
            "Requests: {} (avg response {:.0}ms)",
            summary.total_requests, summary.avg_response_time
        ),
        format!(
            "Errors: {} ({:.2}%)",
            summary.error_count, summary.error_rate
        ),
    ]
}

/// Per-visual table for the most recent record, as the dashboard shows it.
pub fn visual_lines(latest: Option<&MetricRecord>) -> Vec<String> {
    let Some(record) = latest else {
        return Vec::new();
    };
    record
        .powerbi
        .visual_load_times
        .iter()
        .map(|visual| {
            let label = if visual.title.is_empty() {
                visual.visual_id.as_str()
            } else {
                visual.title.as_str()
            };
            format!(
                "{} [{}] load {:.0}ms render {:.0}ms {}KB cpu {}% mem {}% {}",
                label,
                visual.visual_type,
                visual.load_time,
                visual.render_time,
                visual.data_size,
                visual.performance.cpu,
                visual.performance.memory,
                visual.status()
            )
        })
        .collect()
}
