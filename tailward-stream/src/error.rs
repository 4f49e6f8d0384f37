use std::path::PathBuf;

use thiserror::Error;

/// Error surface for stream I/O, watcher registration and task supervision.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("stream '{stream}' task failed: {reason}")]
    Join { stream: String, reason: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StreamError {
    StreamError::Io {
        path: path.into(),
        source,
    }
}
