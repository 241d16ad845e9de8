//! A single small record tracking how many documents have been indexed.
//!
//! Grounded on the teacher's `models::IndexTable`: a whole-structure
//! serialize/deserialize with no partial updates, generalized from an
//! in-memory table to a standalone JSON file per spec §6.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CURRENT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub version: String,
    pub total_docs: u64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            total_docs: 0,
        }
    }
}

pub struct StatsStore {
    path: PathBuf,
}

impl StatsStore {
    /// Creates a stats store backed by the file at `path`. The file is not
    /// touched until `read`, `write`, or `increment` is called.
    ///
    /// # Arguments
    /// * `path` - The path the stats record is read from and written to.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the stats record, or a default (zero docs, current version)
    /// one if the file does not exist yet.
    ///
    /// # Returns
    /// The parsed `Stats`, or `Error::CorruptRecord`/`Error::Io` on a
    /// parse or filesystem failure other than "not found".
    pub fn read(&self) -> Result<Stats> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                serde_json::from_str(&raw).map_err(|e| Error::corrupt(&self.path, e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Stats::default()),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }

    /// Overwrites the stats file with `stats`.
    ///
    /// # Arguments
    /// * `stats` - The record to persist in full.
    ///
    /// # Returns
    /// `Ok(())` once written, or `Error::Io` on a filesystem failure.
    pub fn write(&self, stats: &Stats) -> Result<()> {
        let json = serde_json::to_string(stats).expect("Stats always serializes");
        fs::write(&self.path, json).map_err(|e| Error::io(&self.path, e))
    }

    /// Read-modify-write: bumps `total_docs` by one. Not safe under
    /// concurrent writers (see spec §5).
    ///
    /// # Returns
    /// The stats record after the increment has been written.
    pub fn increment(&self) -> Result<Stats> {
        let mut stats = self.read()?;
        stats.total_docs += 1;
        self.write(&stats)?;
        Ok(stats)
    }
}
