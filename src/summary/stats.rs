/// Arithmetic mean; zero for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentile with linear interpolation between closest ranks.
///
/// `rank = (n - 1) * p / 100`; the result blends the values at
/// `floor(rank)` and `ceil(rank)` by the fractional part. Zero for an empty
/// slice. `p` is clamped to [0, 100].
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let last = sorted.len().saturating_sub(1);
    let rank = last as f64 * p.clamp(0.0, 100.0) / 100.0;
    let lower_rank = rank.floor();
    let weight = rank - lower_rank;
    let lower = (lower_rank as usize).min(last);
    let upper = (rank.ceil() as usize).min(last);

    let (Some(low), Some(high)) = (sorted.get(lower), sorted.get(upper)) else {
        return 0.0;
    };
    low + weight * (high - low)
}
