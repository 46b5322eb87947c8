//! Durable persistence for the open-interest history table

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::shared::errors::StorageError;
use crate::shared::types::{OiHistory, OiSample};

/// CSV-backed history table with columns `timestamp, btc_oi, total_oi`.
///
/// The whole history is rewritten on every save. Writes go to a temp file in
/// the same directory and are renamed over the destination, so an interrupted
/// save cannot clobber the previous successfully-saved file.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted history. A missing file is a cold start, not an
    /// error; an existing file that fails to parse is fatal.
    pub fn load(&self) -> Result<OiHistory, StorageError> {
        if !self.path.exists() {
            debug!("history file {} not found, starting empty", self.path.display());
            return Ok(OiHistory::new());
        }

        let file = fs::File::open(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;

        let mut reader = csv::Reader::from_reader(file);
        let mut samples = Vec::new();
        for record in reader.deserialize() {
            let sample: OiSample = record.map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
            samples.push(sample);
        }

        Ok(OiHistory::from_samples(samples))
    }

    /// Serialize the full history, replacing the destination atomically via
    /// write-to-temp-then-rename.
    pub fn save(&self, history: &OiHistory) -> Result<(), StorageError> {
        let tmp_path = self.tmp_path();

        {
            let mut writer =
                csv::Writer::from_path(&tmp_path).map_err(|source| StorageError::Write {
                    path: tmp_path.clone(),
                    source,
                })?;
            for sample in history.samples() {
                writer.serialize(sample).map_err(|source| StorageError::Write {
                    path: tmp_path.clone(),
                    source,
                })?;
            }
            writer.flush().map_err(|source| StorageError::Write {
                path: tmp_path.clone(),
                source: source.into(),
            })?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source: source.into(),
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut os = self.path.as_os_str().to_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }
}
