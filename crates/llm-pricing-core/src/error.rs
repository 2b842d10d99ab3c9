use std::path::PathBuf;

use crate::catalog::Violation;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("fetch failed (HTTP {status}): {url}")]
    Fetch { status: u16, url: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} has {} invariant violation(s), first: {}", path.display(), violations.len(), violations.first().map(ToString::to_string).unwrap_or_default())]
    InvalidFile {
        path: PathBuf,
        violations: Vec<Violation>,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
