//! Percentage-change computation between consecutive samples

use crate::shared::errors::AnalysisError;
use crate::shared::types::{OiChange, OiSample};

/// Computes the percentage move of a fresh sample relative to the previous
/// stored one. Only defined when a prior sample exists; a zero-valued prior
/// is a checked error rather than a silent `inf`/`NaN`.
pub struct ChangeCalculator;

impl ChangeCalculator {
    pub fn compute(previous: &OiSample, current: &OiSample) -> Result<OiChange, AnalysisError> {
        let btc_change_pct = pct_change(previous.btc_oi, current.btc_oi, "btc_oi")?;
        let total_change_pct = pct_change(previous.total_oi, current.total_oi, "total_oi")?;

        Ok(OiChange {
            btc_change_pct,
            total_change_pct,
        })
    }
}

fn pct_change(reference: f64, current: f64, field: &'static str) -> Result<f64, AnalysisError> {
    if reference == 0.0 || !reference.is_finite() {
        return Err(AnalysisError::ZeroReference { field });
    }
    Ok((current - reference) / reference * 100.0)
}
