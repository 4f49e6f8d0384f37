use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the process runtime, sinks and pid file.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] tailward_core::ConfigError),

    #[error("stream error: {0}")]
    Stream(#[from] tailward_stream::StreamError),

    #[error("sink error for {endpoint}: {source}")]
    Sink {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{task} task failed: {reason}")]
    Task { task: &'static str, reason: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
