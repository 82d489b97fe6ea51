//! Error types for the uixd binary

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a fixture tree
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fixture '{}' is not a valid UI tree: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FixtureError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
