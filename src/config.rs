use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::infrastructure::advisor::AdvisorConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct MarketCfg {
    pub symbol: String,
    pub interval_minutes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorCfg {
    pub sensitivity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageCfg {
    pub history_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub market: MarketCfg,
    pub detector: DetectorCfg,
    pub storage: StorageCfg,
    #[serde(default)]
    pub advisor: AdvisorConfig,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())?;
        let cfg: Self = toml::from_str(&s).context("parse Config.toml")?;
        Ok(cfg)
    }
}
