//! Common types used across the application

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One open-interest observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OiSample {
    /// Stamped at fetch time; assumed non-decreasing across the stored sequence
    pub timestamp: DateTime<Utc>,
    /// Open interest denominated in the base asset
    pub btc_oi: f64,
    /// Open interest denominated in quote currency; equals `btc_oi` when the
    /// upstream USD-denominated field is unavailable
    pub total_oi: f64,
}

impl OiSample {
    pub fn new(timestamp: DateTime<Utc>, btc_oi: f64, total_oi: f64) -> Self {
        Self {
            timestamp,
            btc_oi,
            total_oi,
        }
    }
}

/// Ordered open-interest history, insertion order = chronological order.
///
/// Appends are value-semantic: the input history is never mutated, so a
/// checkpoint taken before an append cannot alias the one taken after.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OiHistory {
    samples: Vec<OiSample>,
}

impl OiHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples(samples: Vec<OiSample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[OiSample] {
        &self.samples
    }

    pub fn last(&self) -> Option<&OiSample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Return a new history with `sample` placed at the end
    #[must_use]
    pub fn append(&self, sample: OiSample) -> Self {
        let mut samples = self.samples.clone();
        samples.push(sample);
        Self { samples }
    }
}

/// Percentage change between the last stored sample and a fresh one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OiChange {
    pub btc_change_pct: f64,
    pub total_change_pct: f64,
}

/// Outcome of the whale threshold comparison, with the values that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhaleDecision {
    pub triggered: bool,
    pub observed_pct: f64,
    pub baseline_pct: f64,
    pub threshold_pct: f64,
}

/// Trade direction suggested by the advisory service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSignal {
    Buy,
    Sell,
    Nothing,
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSignal::Buy => write!(f, "BUY"),
            TradeSignal::Sell => write!(f, "SELL"),
            TradeSignal::Nothing => write!(f, "NOTHING"),
        }
    }
}

/// Parsed advisory response
#[derive(Debug, Clone, PartialEq)]
pub struct Advice {
    pub signal: TradeSignal,
    pub rationale: String,
    pub confidence: u8,
}

impl Advice {
    /// Sentinel returned when the advisory provider fails or replies garbage
    pub fn fallback() -> Self {
        Self {
            signal: TradeSignal::Nothing,
            rationale: "Unable to analyze due to API error".to_string(),
            confidence: 0,
        }
    }
}
