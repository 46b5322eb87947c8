//! Threshold decision gating the advisory call

use crate::shared::types::{OiChange, WhaleDecision};

/// Compares an observed change magnitude against baseline x sensitivity.
///
/// When the threshold is zero or negative (cold or flat baseline), any
/// non-zero change triggers. That hair-trigger is deliberate; no minimum
/// floor is imposed.
#[derive(Debug, Clone)]
pub struct WhaleDetector {
    sensitivity: f64,
}

impl WhaleDetector {
    pub const DEFAULT_SENSITIVITY: f64 = 1.1;

    pub fn new(sensitivity: f64) -> Self {
        Self { sensitivity }
    }

    pub fn detect(&self, change: &OiChange, baseline_pct: f64) -> WhaleDecision {
        let threshold_pct = baseline_pct * self.sensitivity;
        let observed_pct = change.btc_change_pct;

        WhaleDecision {
            triggered: observed_pct.abs() > threshold_pct,
            observed_pct,
            baseline_pct,
            threshold_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(btc_change_pct: f64) -> OiChange {
        OiChange {
            btc_change_pct,
            total_change_pct: btc_change_pct,
        }
    }

    #[test]
    fn test_at_threshold_does_not_trigger() {
        let detector = WhaleDetector::new(1.1);
        // |change| == baseline * sensitivity exactly
        let decision = detector.detect(&change(11.0), 10.0);
        assert!(!decision.triggered);
    }

    #[test]
    fn test_above_threshold_triggers() {
        let detector = WhaleDetector::new(1.1);
        let decision = detector.detect(&change(11.001), 10.0);
        assert!(decision.triggered);
        assert_eq!(decision.threshold_pct, 11.0);
    }

    #[test]
    fn test_below_threshold_does_not_trigger() {
        let detector = WhaleDetector::new(1.1);
        assert!(!detector.detect(&change(5.0), 10.0).triggered);
    }

    #[test]
    fn test_negative_change_uses_magnitude() {
        let detector = WhaleDetector::new(1.1);
        assert!(detector.detect(&change(-12.0), 10.0).triggered);
        assert!(!detector.detect(&change(-5.0), 10.0).triggered);
    }

    #[test]
    fn test_zero_baseline_triggers_on_any_move() {
        let detector = WhaleDetector::new(1.1);
        assert!(detector.detect(&change(0.001), 0.0).triggered);
        assert!(detector.detect(&change(-0.001), 0.0).triggered);
        assert!(!detector.detect(&change(0.0), 0.0).triggered);
    }

    #[test]
    fn test_negative_baseline_triggers_on_any_move() {
        let detector = WhaleDetector::new(1.1);
        let decision = detector.detect(&change(0.5), -2.0);
        assert!(decision.triggered);
        assert!(decision.threshold_pct < 0.0);
    }

    #[test]
    fn test_decision_carries_audit_values() {
        let detector = WhaleDetector::new(2.0);
        let decision = detector.detect(&change(7.0), 3.0);
        assert_eq!(decision.observed_pct, 7.0);
        assert_eq!(decision.baseline_pct, 3.0);
        assert_eq!(decision.threshold_pct, 6.0);
        assert!(decision.triggered);
    }
}
