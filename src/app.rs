// src/app.rs
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::application::{MonitorConfig, WhaleMonitor};
use crate::config::Config;
use crate::domain::history::HistoryStore;
use crate::infrastructure::advisor::{AdvisorConfig, OpenAiAdvisor};
use crate::infrastructure::market::BinanceFuturesClient;

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub symbol: String,
    pub interval_minutes: u64,
    pub sensitivity: f64,
    pub history_path: String,
    pub advisor: AdvisorConfig,
    pub once: bool,
}

impl AppCfg {
    pub fn from_config(cfg: Config, once: bool) -> Self {
        Self {
            symbol: cfg.market.symbol,
            interval_minutes: cfg.market.interval_minutes,
            sensitivity: cfg.detector.sensitivity,
            history_path: cfg.storage.history_path,
            advisor: cfg.advisor,
            once,
        }
    }
}

pub async fn run(app_cfg: AppCfg) -> Result<()> {
    info!("Starting open-interest whale monitor");
    info!("Configuration: {:?}", app_cfg);

    let _ = dotenvy::dotenv();
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY not found in environment variables")?;

    let market = BinanceFuturesClient::new().context("build market data client")?;
    let advisor =
        OpenAiAdvisor::new(api_key, app_cfg.advisor.clone()).context("build advisory client")?;
    let store = HistoryStore::new(&app_cfg.history_path);

    let monitor_config = MonitorConfig {
        symbol: app_cfg.symbol.clone(),
        check_interval: Duration::from_secs(app_cfg.interval_minutes * 60),
        sensitivity: app_cfg.sensitivity,
    };

    let mut monitor = WhaleMonitor::new(monitor_config, market, advisor, store)?;

    if app_cfg.once {
        monitor.run_cycle().await?;
        return Ok(());
    }

    monitor.run().await?;
    Ok(())
}
