//! Whalewatch - open-interest whale activity monitor
//! Built with Domain-Driven Design principles

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{CycleOutcome, WhaleMonitor};
pub use domain::analysis::{BaselineEstimator, ChangeCalculator, WhaleDetector};
pub use domain::history::HistoryStore;
pub use infrastructure::advisor::{AdvisoryService, OpenAiAdvisor};
pub use infrastructure::market::{BinanceFuturesClient, MarketDataSource};
