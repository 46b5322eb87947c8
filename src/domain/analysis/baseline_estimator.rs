//! Trailing mean-change baseline estimation

use crate::shared::types::OiHistory;

/// Mean period-over-period percentage change of `btc_oi` across the entire
/// stored history, used as a crude self-adjusting volatility reference.
///
/// The scan is O(n) over the full table every cycle; at the sampling cadence
/// this runs at, the table stays far below any size where that matters.
/// Pairs whose reference value is zero or non-finite are excluded from the
/// mean instead of poisoning it.
pub struct BaselineEstimator;

impl BaselineEstimator {
    /// Returns 0.0 for histories with fewer than two samples or with no
    /// valid consecutive pair.
    pub fn estimate(history: &OiHistory) -> f64 {
        let samples = history.samples();
        if samples.len() < 2 {
            return 0.0;
        }

        let mut sum = 0.0;
        let mut count = 0u32;
        for pair in samples.windows(2) {
            let reference = pair[0].btc_oi;
            let current = pair[1].btc_oi;
            if reference == 0.0 || !reference.is_finite() || !current.is_finite() {
                continue;
            }
            sum += (current - reference) / reference * 100.0;
            count += 1;
        }

        if count == 0 {
            return 0.0;
        }

        let mean = sum / count as f64;
        if mean.is_finite() {
            mean
        } else {
            0.0
        }
    }
}
