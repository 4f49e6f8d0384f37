//! Ordered collection of configured streams.

use std::sync::Arc;

use tokio::sync::broadcast;

use tailward_core::{Config, StreamConfig, StreamId, StreamSettings};

use crate::driver::run_stream;
use crate::error::StreamError;
use crate::message::Sink;

/// Owns the stream definitions and the limits threaded into each of them.
#[derive(Debug, Clone)]
pub struct StreamRegistry {
    streams: Vec<StreamConfig>,
    settings: StreamSettings,
}

impl StreamRegistry {
    pub fn new(streams: Vec<StreamConfig>, settings: StreamSettings) -> Self {
        Self { streams, settings }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.streams.clone(), config.stream_settings())
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &StreamId> {
        self.streams.iter().map(|stream| &stream.id)
    }

    /// Start every stream and wait until each one has finished, which
    /// happens on shutdown or once a stream gives up opening its file.
    pub async fn run(
        self,
        sink: Arc<dyn Sink>,
        shutdown: broadcast::Sender<()>,
    ) -> Result<(), StreamError> {
        let settings = self.settings;
        let handles: Vec<_> = self
            .streams
            .into_iter()
            .map(|config| {
                let id = config.id.clone();
                tracing::info!(stream = %id, path = %config.path.display(), "starting stream");
                let handle = tokio::spawn(run_stream(
                    config,
                    settings,
                    sink.clone(),
                    shutdown.clone(),
                ));
                (id, handle)
            })
            .collect();

        for (id, handle) in handles {
            handle.await.map_err(|err| StreamError::Join {
                stream: id.0,
                reason: err.to_string(),
            })?;
        }
        Ok(())
    }
}
