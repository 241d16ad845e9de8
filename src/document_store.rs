//! Document store: persists raw document payloads, sharded into
//! hash-named directories the same way segments are, per spec §6's
//! `<docs_root>/<6hex>/<id>.json` layout.
//!
//! Generalizes the teacher's `DocumentStore` (an in-memory path<->id table)
//! into an on-disk JSON blob store keyed directly by the caller's document
//! id rather than a synthesized integer id.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::segment::hash_name;

pub struct DocumentStore {
    docs_dir: PathBuf,
}

impl DocumentStore {
    /// Opens a document store rooted at `docs_dir`, creating the directory
    /// if it does not already exist.
    ///
    /// # Arguments
    /// * `docs_dir` - The directory shard directories (`<6hex>/`) live
    ///   under.
    ///
    /// # Returns
    /// The opened store, or an `Error::Io` if the directory could not be
    /// created.
    pub fn new(docs_dir: impl Into<PathBuf>) -> Result<Self> {
        let docs_dir = docs_dir.into();
        fs::create_dir_all(&docs_dir).map_err(|e| Error::io(&docs_dir, e))?;
        Ok(Self { docs_dir })
    }

    fn path_for(&self, doc_id: &str) -> PathBuf {
        self.docs_dir
            .join(hash_name(doc_id, 6))
            .join(format!("{doc_id}.json"))
    }

    /// Writes `payload` for `doc_id`, overwriting any prior payload.
    ///
    /// # Arguments
    /// * `doc_id` - The document id to store `payload` under.
    /// * `payload` - The JSON object to persist.
    ///
    /// # Returns
    /// `Ok(())` once written, or an `Error::Io` if the shard directory or
    /// file could not be written.
    pub fn save(&self, doc_id: &str, payload: &Value) -> Result<()> {
        let path = self.path_for(doc_id);
        let dir = path.parent().expect("document path has a shard directory");
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        let json = serde_json::to_string(payload).expect("JSON value always serializes");
        fs::write(&path, json).map_err(|e| Error::io(&path, e))
    }

    /// Loads the payload stored for `doc_id`.
    ///
    /// # Arguments
    /// * `doc_id` - The document id to look up.
    ///
    /// # Returns
    /// The stored JSON payload, `Error::NotFound` if no file exists for
    /// `doc_id`, or `Error::CorruptRecord` if the stored file is not valid
    /// JSON.
    pub fn load(&self, doc_id: &str) -> Result<Value> {
        let path = self.path_for(doc_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(doc_id.to_string()));
            }
            Err(e) => return Err(Error::io(&path, e)),
        };

        serde_json::from_str(&raw).map_err(|e| Error::corrupt(&path, e.to_string()))
    }
}
