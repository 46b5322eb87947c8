//! Error handling for the application

use std::path::PathBuf;

use thiserror::Error;

/// Market data source errors
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("OI request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OI request returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("OI payload contained no data points")]
    EmptyPayload,

    #[error("malformed OI payload: {0}")]
    MalformedPayload(String),
}

/// History storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read history file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write history file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Analysis errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("previous sample has a zero or non-finite {field}, change is undefined")]
    ZeroReference { field: &'static str },
}

/// Advisory service errors, contained inside the advisor boundary
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("advisory request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("advisory API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("advisory reply was empty or malformed")]
    MalformedReply,
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("configuration error: {0}")]
    Config(String),
}
