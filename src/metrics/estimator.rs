use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{VisualDescriptor, VisualMetric, VisualUtilization};

/// Render time as a share of load time for synthetic visuals.
const RENDER_SHARE: f64 = 0.7;

/// Produces one [`VisualMetric`] per descriptor, in input order.
pub trait VisualLoadEstimator: Send + Sync {
    fn estimate(&self, visuals: Option<&[VisualDescriptor]>) -> Vec<VisualMetric>;
}

/// Demo estimator that synthesizes plausible timings instead of measuring.
///
/// Load time is uniform in [500, 1500) ms, render time is 70% of it, data
/// size is in [100, 1100) KB and utilization in [0, 100]%.
#[derive(Debug)]
pub struct SyntheticEstimator {
    rng: Mutex<StdRng>,
}

impl Default for SyntheticEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticEstimator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic output for a given seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl VisualLoadEstimator for SyntheticEstimator {
    fn estimate(&self, visuals: Option<&[VisualDescriptor]>) -> Vec<VisualMetric> {
        let Some(visuals) = visuals else {
            return Vec::new();
        };
        let Ok(mut rng) = self.rng.lock() else {
            tracing::error!("Visual estimator RNG lock poisoned; skipping visuals");
            return Vec::new();
        };
        visuals
            .iter()
            .map(|visual| {
                let load_time = rng.gen_range(500.0..1500.0);
                VisualMetric {
                    visual_id: visual.id.clone(),
                    visual_type: visual.visual_type.clone(),
                    title: visual.title.clone(),
                    load_time,
                    render_time: load_time * RENDER_SHARE,
                    data_size: rng.gen_range(100..1100),
                    performance: VisualUtilization {
                        cpu: rng.gen_range(0..=100),
                        memory: rng.gen_range(0..=100),
                    },
                }
            })
            .collect()
    }
}
