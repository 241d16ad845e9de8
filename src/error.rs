use std::path::PathBuf;

use thiserror::Error;

/// Why a document failed schema validation (spec §4.5 distinguishes these
/// two conditions).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SchemaReason {
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("document is missing a `text` field")]
    MissingText,
}

/// The error surface of the core engine.
///
/// Callers match on these variants; they are not meant to be a catch-all for
/// every internal failure mode (those are folded into `Io`).
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid document: {0}")]
    Schema(#[from] SchemaReason),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("corrupt segment record in {path}: {reason}")]
    CorruptRecord { path: PathBuf, reason: String },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::CorruptRecord {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
