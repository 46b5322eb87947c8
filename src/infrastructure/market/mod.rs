//! Market data source implementations

pub mod binance_client;

pub use binance_client::{BinanceFuturesClient, MarketDataSource};
