//! Binance USD-M futures open-interest client

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::shared::errors::MarketDataError;
use crate::shared::types::OiSample;

/// Capability interface for pulling the latest open-interest sample
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_latest_oi(&self, symbol: &str) -> Result<OiSample, MarketDataError>;
}

const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Exchange-side aggregation bucket for the OI history endpoint
const OI_PERIOD: &str = "5m";

/// One row of the `/futures/data/openInterestHist` payload. Binance returns
/// the numeric fields as strings.
#[derive(Debug, Deserialize)]
struct OpenInterestRow {
    #[serde(rename = "sumOpenInterest")]
    sum_open_interest: String,
    /// Quote-denominated OI; absent on some instruments
    #[serde(rename = "sumOpenInterestValue")]
    sum_open_interest_value: Option<String>,
}

pub struct BinanceFuturesClient {
    client: Client,
    base_url: String,
}

impl BinanceFuturesClient {
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Convert a payload row into a sample, stamped at fetch time. Quote OI
    /// falls back to the base value when the exchange omits it.
    fn parse_row(row: OpenInterestRow) -> Result<OiSample, MarketDataError> {
        let btc_oi: f64 = row.sum_open_interest.parse().map_err(|_| {
            MarketDataError::MalformedPayload(format!(
                "sumOpenInterest is not a number: {:?}",
                row.sum_open_interest
            ))
        })?;

        let total_oi = match row.sum_open_interest_value {
            Some(value) => value.parse().map_err(|_| {
                MarketDataError::MalformedPayload(format!(
                    "sumOpenInterestValue is not a number: {value:?}"
                ))
            })?,
            None => btc_oi,
        };

        Ok(OiSample::new(Utc::now(), btc_oi, total_oi))
    }
}

#[async_trait]
impl MarketDataSource for BinanceFuturesClient {
    async fn fetch_latest_oi(&self, symbol: &str) -> Result<OiSample, MarketDataError> {
        let url = format!("{}/futures/data/openInterestHist", self.base_url);
        debug!("fetching OI for {symbol} from {url}");

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol), ("period", OI_PERIOD), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::BadStatus { status, body });
        }

        let rows: Vec<OpenInterestRow> = response
            .json()
            .await
            .map_err(|e| MarketDataError::MalformedPayload(e.to_string()))?;

        let latest = rows
            .into_iter()
            .next_back()
            .ok_or(MarketDataError::EmptyPayload)?;

        Self::parse_row(latest)
    }
}
