//! Executes a [`Stream`]'s commands on the tokio reactor.
//!
//! Each open/stat/read/timer is spawned as its own task that owns every
//! resource it needs and ends by sending exactly one completion event back
//! to the stream's queue. The stream task itself is the only place the
//! machine is touched, so transitions never run concurrently.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::{broadcast, mpsc};

use tailward_core::{StreamConfig, StreamSettings};

use crate::error::{io_err, StreamError};
use crate::machine::{Command, Epoch, Event, Stream};
use crate::message::Sink;
use crate::watcher::{self, Watch};

/// Drive one stream until shutdown is signalled or it gives up on opening.
pub async fn run_stream(
    config: StreamConfig,
    settings: StreamSettings,
    sink: Arc<dyn Sink>,
    shutdown: broadcast::Sender<()>,
) {
    let mut shutdown_rx = shutdown.subscribe();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event<File>>();

    let mut stream = Stream::new(config.id, config.path.clone(), settings);
    let mut driver = Driver {
        path: config.path,
        events: event_tx,
        watch: None,
        sink,
        shutdown,
    };

    driver.execute(stream.start());
    while !stream.is_dead() {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                let commands = stream.handle(event);
                driver.execute(commands);
            }
        }
    }

    tracing::debug!(stream = %stream.id(), state = ?stream.state(), "stream task finished");
}

struct Driver {
    path: PathBuf,
    events: mpsc::UnboundedSender<Event<File>>,
    watch: Option<Watch>,
    sink: Arc<dyn Sink>,
    shutdown: broadcast::Sender<()>,
}

impl Driver {
    fn execute(&mut self, commands: Vec<Command<File>>) {
        for command in commands {
            match command {
                Command::Open => self.open(),
                Command::Watch { epoch } => self.watch(epoch),
                // Runs after the transition that asked for it has returned.
                Command::Unwatch => drop(self.watch.take()),
                Command::Stat { epoch } => self.stat(epoch),
                Command::Read {
                    epoch,
                    handle,
                    seek,
                    len,
                } => self.read(epoch, handle, seek, len),
                Command::ScheduleRetry(delay) => self.after(delay, Event::RetryElapsed),
                Command::ScheduleReadRetry { epoch, delay } => {
                    self.after(delay, Event::ReadRetryElapsed { epoch })
                }
                Command::Deliver(message) => self.sink.submit(message),
                Command::Shutdown => {
                    let _ = self.shutdown.send(());
                }
            }
        }
    }

    fn open(&self) {
        let path = self.path.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = File::open(&path).await.map_err(|e| io_err(&path, e));
            let _ = events.send(Event::Opened(result));
        });
    }

    fn watch(&mut self, epoch: Epoch) {
        // Drop any previous subscription before registering the new one.
        self.watch = None;
        match watcher::subscribe(&self.path, epoch, self.events.clone()) {
            Ok(watch) => self.watch = Some(watch),
            Err(error) => {
                let _ = self.events.send(Event::WatchFailed { epoch, error });
            }
        }
    }

    fn stat(&self, epoch: Epoch) {
        let path = self.path.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = tokio::fs::metadata(&path)
                .await
                .map(|meta| meta.len())
                .map_err(|e| io_err(&path, e));
            let _ = events.send(Event::Stat { epoch, result });
        });
    }

    fn read(&self, epoch: Epoch, mut handle: File, seek: Option<u64>, len: usize) {
        let path = self.path.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = read_chunk(&mut handle, &path, seek, len).await;
            let _ = events.send(Event::Read {
                epoch,
                handle,
                result,
            });
        });
    }

    fn after(&self, delay: Duration, event: Event<File>) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(event);
        });
    }
}

async fn read_chunk(
    handle: &mut File,
    path: &Path,
    seek: Option<u64>,
    len: usize,
) -> Result<Vec<u8>, StreamError> {
    if let Some(offset) = seek {
        handle
            .seek(SeekFrom::Start(offset))
            .await
            .map_err(|e| io_err(path, e))?;
    }
    let mut buffer = vec![0u8; len];
    let read = handle.read(&mut buffer).await.map_err(|e| io_err(path, e))?;
    buffer.truncate(read);
    Ok(buffer)
}
