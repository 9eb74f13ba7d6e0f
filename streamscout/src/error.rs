use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure to load the channel catalog. Fatal: nothing is probed.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure inside a single probe.
///
/// These never leave the probe: they are logged and turned into an
/// outcome without a URL.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to open browser session: {0}")]
    Session(String),

    #[error("navigation to '{url}' failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("'{what}' timed out after {}ms", .timeout.as_millis())]
    Timeout { what: String, timeout: Duration },
}

/// Failure to render or persist one output file.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to serialize playlist: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
