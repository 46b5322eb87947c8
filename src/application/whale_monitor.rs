//! Monitoring cycle orchestration

use std::time::{Duration, Instant};

use tokio::time;
use tracing::{error, info, warn};

use crate::domain::analysis::{BaselineEstimator, ChangeCalculator, WhaleDetector};
use crate::domain::history::HistoryStore;
use crate::infrastructure::advisor::AdvisoryService;
use crate::infrastructure::market::MarketDataSource;
use crate::shared::errors::{AnalysisError, AppError};
use crate::shared::types::{Advice, OiChange, OiHistory, OiSample, WhaleDecision};
use crate::shared::utils::{format_oi, format_pct};

/// Stats are logged once per this many completed cycles (~1h at the default
/// 5-minute interval).
const STATS_EVERY_CYCLES: u64 = 12;

/// Monitoring configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub symbol: String,
    pub check_interval: Duration,
    pub sensitivity: f64,
}

/// Running statistics for the monitoring loop
#[derive(Debug, Clone)]
pub struct MonitorStats {
    pub start_time: Instant,
    pub cycles_completed: u64,
    pub whales_detected: u64,
    pub fetch_failures: u64,
}

impl MonitorStats {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            cycles_completed: 0,
            whales_detected: 0,
            fetch_failures: 0,
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for MonitorStats {
    fn default() -> Self {
        Self::new()
    }
}

/// What a single cycle did
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// First sample stored; nothing to compare against yet
    Bootstrap,
    /// Change stayed within the threshold
    Quiet {
        change: OiChange,
        decision: WhaleDecision,
    },
    /// Threshold exceeded; advisory response attached
    Whale {
        change: OiChange,
        decision: WhaleDecision,
        advice: Advice,
    },
    /// Fetch failed; history and storage untouched
    SkippedFetch,
    /// Prior sample had a zero reference value; the new sample was appended
    /// so the history self-heals, but detection was skipped
    UndefinedChange,
}

/// Orchestrates one sampling round: fetch, compute, detect, advise, append,
/// persist. Owns the single history value; persistence happens exactly once,
/// at the end of a completed cycle.
pub struct WhaleMonitor<M, A> {
    config: MonitorConfig,
    market: M,
    advisor: A,
    store: HistoryStore,
    detector: WhaleDetector,
    history: OiHistory,
    stats: MonitorStats,
}

impl<M, A> WhaleMonitor<M, A>
where
    M: MarketDataSource,
    A: AdvisoryService,
{
    /// Load the persisted history and build the monitor. A corrupt history
    /// file is fatal here; the process must not synthesize data.
    pub fn new(
        config: MonitorConfig,
        market: M,
        advisor: A,
        store: HistoryStore,
    ) -> Result<Self, AppError> {
        let history = store.load()?;
        info!(
            "📂 Loaded {} historical samples from {}",
            history.len(),
            store.path().display()
        );

        let detector = WhaleDetector::new(config.sensitivity);

        Ok(Self {
            config,
            market,
            advisor,
            store,
            detector,
            history,
            stats: MonitorStats::new(),
        })
    }

    pub fn history(&self) -> &OiHistory {
        &self.history
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    /// Execute one monitoring cycle
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, AppError> {
        let sample = match self.market.fetch_latest_oi(&self.config.symbol).await {
            Ok(sample) => sample,
            Err(e) => {
                warn!("⚠️ Skipping cycle, OI fetch failed: {e}");
                self.stats.fetch_failures += 1;
                return Ok(CycleOutcome::SkippedFetch);
            }
        };

        let change = match self.history.last() {
            None => {
                info!(
                    "🚀 Initial data point added: {} {} OI",
                    format_oi(sample.btc_oi),
                    self.config.symbol
                );
                self.persist_append(sample)?;
                self.stats.cycles_completed += 1;
                return Ok(CycleOutcome::Bootstrap);
            }
            Some(previous) => ChangeCalculator::compute(previous, &sample),
        };

        let change = match change {
            Ok(change) => change,
            Err(AnalysisError::ZeroReference { field }) => {
                error!("❌ Change undefined: previous sample has zero {field}; detection skipped");
                self.persist_append(sample)?;
                self.stats.cycles_completed += 1;
                return Ok(CycleOutcome::UndefinedChange);
            }
        };

        // Baseline comes from the stored history only, before the fresh
        // sample is appended.
        let baseline = BaselineEstimator::estimate(&self.history);
        let decision = self.detector.detect(&change, baseline);

        info!(
            "🔍 Avg change: {}, threshold: {}, BTC change: {}",
            format_pct(decision.baseline_pct),
            format_pct(decision.threshold_pct),
            format_pct(decision.observed_pct)
        );
        info!("🐋 Whale activity detected: {}", decision.triggered);

        let outcome = if decision.triggered {
            self.stats.whales_detected += 1;
            let advice = self.advisor.analyze(&change).await;
            info!(
                "🤖 AI analysis: {} (confidence {}%) - {}",
                advice.signal, advice.confidence, advice.rationale
            );
            CycleOutcome::Whale {
                change,
                decision,
                advice,
            }
        } else {
            CycleOutcome::Quiet { change, decision }
        };

        self.persist_append(sample)?;
        self.stats.cycles_completed += 1;
        Ok(outcome)
    }

    /// Run cycles forever at the configured interval. The first cycle fires
    /// immediately; a fetch failure skips the cycle, a storage failure stops
    /// the loop.
    pub async fn run(&mut self) -> Result<(), AppError> {
        info!(
            "🐋 Whale monitor started for {} (every {:?}, sensitivity {})",
            self.config.symbol, self.config.check_interval, self.config.sensitivity
        );

        let mut interval = time::interval(self.config.check_interval);
        loop {
            interval.tick().await;
            self.run_cycle().await?;

            if self.stats.cycles_completed > 0 && self.stats.cycles_completed % STATS_EVERY_CYCLES == 0
            {
                self.log_stats();
            }
        }
    }

    fn log_stats(&self) {
        info!(
            "📊 Uptime {:.1} min | cycles: {} | whales: {} | fetch failures: {}",
            self.stats.uptime().as_secs_f64() / 60.0,
            self.stats.cycles_completed,
            self.stats.whales_detected,
            self.stats.fetch_failures
        );
    }

    /// Append the sample as a new history value and flush it to storage;
    /// only then replace the in-memory history.
    fn persist_append(&mut self, sample: OiSample) -> Result<(), AppError> {
        let next = self.history.append(sample);
        self.store.save(&next)?;
        self.history = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use crate::shared::errors::MarketDataError;
    use crate::shared::types::TradeSignal;

    struct ScriptedMarket {
        responses: Mutex<Vec<Result<OiSample, MarketDataError>>>,
    }

    impl ScriptedMarket {
        fn new(responses: Vec<Result<OiSample, MarketDataError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
            })
        }
    }

    #[async_trait]
    impl MarketDataSource for Arc<ScriptedMarket> {
        async fn fetch_latest_oi(&self, _symbol: &str) -> Result<OiSample, MarketDataError> {
            self.responses.lock().unwrap().remove(0)
        }
    }

    #[derive(Default)]
    struct RecordingAdvisor {
        calls: Mutex<Vec<OiChange>>,
    }

    impl RecordingAdvisor {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AdvisoryService for Arc<RecordingAdvisor> {
        async fn analyze(&self, change: &OiChange) -> Advice {
            self.calls.lock().unwrap().push(*change);
            Advice {
                signal: TradeSignal::Buy,
                rationale: "scripted".to_string(),
                confidence: 80,
            }
        }
    }

    fn sample(secs: i64, btc_oi: f64, total_oi: f64) -> OiSample {
        OiSample::new(Utc.timestamp_opt(secs, 0).unwrap(), btc_oi, total_oi)
    }

    fn config() -> MonitorConfig {
        MonitorConfig {
            symbol: "BTCUSDT".to_string(),
            check_interval: Duration::from_secs(300),
            sensitivity: 1.1,
        }
    }

    fn store_with(dir: &tempfile::TempDir, samples: &[OiSample]) -> HistoryStore {
        let store = HistoryStore::new(dir.path().join("oi_history.csv"));
        if !samples.is_empty() {
            store
                .save(&OiHistory::from_samples(samples.to_vec()))
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_bootstrap_cycle_appends_without_detection() {
        let dir = tempdir().unwrap();
        let market = ScriptedMarket::new(vec![Ok(sample(0, 1000.0, 1000.0))]);
        let advisor = RecordingAdvisor::new();
        let store = store_with(&dir, &[]);

        let mut monitor =
            WhaleMonitor::new(config(), market, advisor.clone(), store).unwrap();

        let outcome = monitor.run_cycle().await.unwrap();

        assert_eq!(outcome, CycleOutcome::Bootstrap);
        assert_eq!(monitor.history().len(), 1);
        assert_eq!(advisor.call_count(), 0);

        // Restart from the same file reconstructs the state
        let reloaded = HistoryStore::new(dir.path().join("oi_history.csv"))
            .load()
            .unwrap();
        assert_eq!(reloaded.len(), 1);
    }

    #[tokio::test]
    async fn test_single_prior_sample_triggers_on_big_move() {
        // History [(t0, 1000, 1000)], new sample (t1, 1200, 1200):
        // baseline from the single-sample history is 0, threshold 0, and the
        // 20% observed change triggers.
        let dir = tempdir().unwrap();
        let market = ScriptedMarket::new(vec![Ok(sample(300, 1200.0, 1200.0))]);
        let advisor = RecordingAdvisor::new();
        let store = store_with(&dir, &[sample(0, 1000.0, 1000.0)]);

        let mut monitor =
            WhaleMonitor::new(config(), market, advisor.clone(), store).unwrap();

        let outcome = monitor.run_cycle().await.unwrap();

        match outcome {
            CycleOutcome::Whale {
                change, decision, ..
            } => {
                assert!((change.btc_change_pct - 20.0).abs() < 1e-9);
                assert_eq!(decision.baseline_pct, 0.0);
                assert_eq!(decision.threshold_pct, 0.0);
                assert!(decision.triggered);
            }
            other => panic!("expected Whale outcome, got {other:?}"),
        }

        assert_eq!(advisor.call_count(), 1);
        assert_eq!(monitor.history().len(), 2);
    }

    #[tokio::test]
    async fn test_quiet_cycle_makes_no_advisory_call() {
        // Baseline from [1000, 1100, 1210] is +10%, threshold 11%; a +3.3%
        // move stays inside it.
        let dir = tempdir().unwrap();
        let market = ScriptedMarket::new(vec![Ok(sample(900, 1250.0, 1250.0))]);
        let advisor = RecordingAdvisor::new();
        let store = store_with(
            &dir,
            &[
                sample(0, 1000.0, 1000.0),
                sample(300, 1100.0, 1100.0),
                sample(600, 1210.0, 1210.0),
            ],
        );

        let mut monitor =
            WhaleMonitor::new(config(), market, advisor.clone(), store).unwrap();

        let outcome = monitor.run_cycle().await.unwrap();

        match outcome {
            CycleOutcome::Quiet { decision, .. } => {
                assert!(!decision.triggered);
                assert!((decision.baseline_pct - 10.0).abs() < 1e-9);
            }
            other => panic!("expected Quiet outcome, got {other:?}"),
        }

        assert_eq!(advisor.call_count(), 0);
        assert_eq!(monitor.history().len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_everything_untouched() {
        let dir = tempdir().unwrap();
        let market = ScriptedMarket::new(vec![Err(MarketDataError::EmptyPayload)]);
        let advisor = RecordingAdvisor::new();
        let store = store_with(&dir, &[sample(0, 1000.0, 1000.0)]);

        let mut monitor =
            WhaleMonitor::new(config(), market, advisor.clone(), store).unwrap();

        let outcome = monitor.run_cycle().await.unwrap();

        assert_eq!(outcome, CycleOutcome::SkippedFetch);
        assert_eq!(monitor.history().len(), 1);
        assert_eq!(advisor.call_count(), 0);
        assert_eq!(monitor.stats().fetch_failures, 1);
        assert_eq!(monitor.stats().cycles_completed, 0);

        let reloaded = HistoryStore::new(dir.path().join("oi_history.csv"))
            .load()
            .unwrap();
        assert_eq!(reloaded.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_prior_yields_undefined_change_and_still_appends() {
        let dir = tempdir().unwrap();
        let market = ScriptedMarket::new(vec![Ok(sample(300, 1000.0, 1000.0))]);
        let advisor = RecordingAdvisor::new();
        let store = store_with(&dir, &[sample(0, 0.0, 1000.0)]);

        let mut monitor =
            WhaleMonitor::new(config(), market, advisor.clone(), store).unwrap();

        let outcome = monitor.run_cycle().await.unwrap();

        assert_eq!(outcome, CycleOutcome::UndefinedChange);
        assert_eq!(monitor.history().len(), 2);
        assert_eq!(advisor.call_count(), 0);

        // Next cycle has a sane prior again
        let market = ScriptedMarket::new(vec![Ok(sample(600, 1010.0, 1010.0))]);
        let store = HistoryStore::new(dir.path().join("oi_history.csv"));
        let mut monitor =
            WhaleMonitor::new(config(), market, advisor.clone(), store).unwrap();
        let outcome = monitor.run_cycle().await.unwrap();
        assert!(matches!(
            outcome,
            CycleOutcome::Whale { .. } | CycleOutcome::Quiet { .. }
        ));
    }

    #[tokio::test]
    async fn test_corrupt_history_is_fatal_at_startup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("oi_history.csv");
        std::fs::write(&path, "timestamp,btc_oi,total_oi\ngarbage,x,y\n").unwrap();

        let market = ScriptedMarket::new(vec![]);
        let advisor = RecordingAdvisor::new();
        let store = HistoryStore::new(&path);

        assert!(WhaleMonitor::new(config(), market, advisor, store).is_err());
    }
}
