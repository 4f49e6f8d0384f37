//! Change-notification subscription for one stream, backed by `notify`.
//!
//! Uses OS-level file system notifications:
//! - Linux: inotify
//! - macOS: FSEvents
//! - Windows: ReadDirectoryChangesW

use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{recommended_watcher, Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::StreamError;
use crate::machine::{Change, Epoch, Event};

/// Live subscription. Dropping it releases the OS watch.
pub struct Watch {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl Watch {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for Watch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watch").field("path", &self.path).finish()
    }
}

/// Watch `path` and forward classified notifications, tagged with `epoch`,
/// into the stream's event queue.
pub fn subscribe<H: Send + 'static>(
    path: &Path,
    epoch: Epoch,
    events: mpsc::UnboundedSender<Event<H>>,
) -> Result<Watch, StreamError> {
    let watched = path.to_path_buf();
    let callback_path = watched.clone();
    let mut watcher = recommended_watcher(move |result: notify::Result<NotifyEvent>| {
        match result {
            Ok(event) => {
                if let Some(change) = classify(&event.kind, &callback_path) {
                    let _ = events.send(Event::Changed { epoch, change });
                }
            }
            Err(err) => {
                tracing::warn!(path = %callback_path.display(), error = %err, "watcher event error");
            }
        }
    })
    .map_err(|source| StreamError::Watch {
        path: watched.clone(),
        source,
    })?;

    watcher
        .watch(&watched, RecursiveMode::NonRecursive)
        .map_err(|source| StreamError::Watch {
            path: watched.clone(),
            source,
        })?;
    tracing::debug!(path = %watched.display(), epoch, "watching file");

    Ok(Watch {
        _watcher: watcher,
        path: watched,
    })
}

/// Map a raw notification onto what the stream cares about. Access events
/// (including the ones our own reads cause) are dropped.
pub fn classify(kind: &EventKind, path: &Path) -> Option<Change> {
    match kind {
        EventKind::Access(_) => None,
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
            Some(Change::Content)
        }
        _ => Some(Change::Other {
            path_exists: path.exists(),
        }),
    }
}
