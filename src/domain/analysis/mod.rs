//! Change, baseline, and whale-threshold analysis

pub mod baseline_estimator;
pub mod change_calculator;
pub mod whale_detector;

pub use baseline_estimator::BaselineEstimator;
pub use change_calculator::ChangeCalculator;
pub use whale_detector::WhaleDetector;
