//! Per-file watch/stat/read state machine.
//!
//! The machine performs no I/O. [`Stream::handle`] consumes one completion
//! [`Event`] and returns the [`Command`]s the driver must issue next. The
//! handle type `H` is whatever the driver opens (a tokio `File` in
//! production); while a read is in flight the handle travels with the read
//! and comes back in its completion, so a second concurrent read on the same
//! stream cannot be expressed.
//!
//! Every open bumps the stream's epoch. Stat, read, change and read-retry
//! events carry the epoch they were issued under and are ignored once the
//! stream has moved on to a newer open.

use std::mem;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use tailward_core::{StreamId, StreamSettings};

use crate::assembler::LineAssembler;
use crate::error::StreamError;
use crate::message::{dispatch, Dispatch};

/// Open generation counter.
pub type Epoch = u64;

/// Observable lifecycle state, without the associated data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Closed,
    Opening,
    RetryWait,
    Open,
    Reading,
    Dead,
}

#[derive(Debug)]
enum Phase<H> {
    Closed,
    Opening,
    RetryWait,
    Open { handle: H },
    Reading,
    Dead,
}

/// Classified filesystem notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// File content was written or truncated.
    Content,
    /// Anything else (rename, metadata, removal). `path_exists` is sampled
    /// when the notification is received.
    Other { path_exists: bool },
}

/// Completion of an operation previously requested through a [`Command`].
#[derive(Debug)]
pub enum Event<H> {
    Opened(Result<H, StreamError>),
    WatchFailed { epoch: Epoch, error: StreamError },
    Stat { epoch: Epoch, result: Result<u64, StreamError> },
    Read { epoch: Epoch, handle: H, result: Result<Vec<u8>, StreamError> },
    Changed { epoch: Epoch, change: Change },
    RetryElapsed,
    ReadRetryElapsed { epoch: Epoch },
}

/// Work the driver must perform on behalf of the machine.
#[derive(Debug)]
pub enum Command<H> {
    /// Open the stream's path read-only.
    Open,
    /// Subscribe to change notifications, tagging them with `epoch`.
    Watch { epoch: Epoch },
    /// Release the current change subscription.
    Unwatch,
    Stat { epoch: Epoch },
    /// Optionally seek to `seek` (absolute offset), then read up to `len` bytes.
    Read { epoch: Epoch, handle: H, seek: Option<u64>, len: usize },
    ScheduleRetry(Duration),
    ScheduleReadRetry { epoch: Epoch, delay: Duration },
    Deliver(String),
    Shutdown,
}

/// Runtime state of one tailed file.
#[derive(Debug)]
pub struct Stream<H> {
    id: StreamId,
    path: PathBuf,
    settings: StreamSettings,
    phase: Phase<H>,
    epoch: Epoch,
    attempts: u32,
    read_failures: u32,
    known_size: Option<u64>,
    pending_seek: Option<u64>,
    assembler: LineAssembler,
}

impl<H> Stream<H> {
    pub fn new(id: StreamId, path: impl Into<PathBuf>, settings: StreamSettings) -> Self {
        Self {
            id,
            path: path.into(),
            settings,
            phase: Phase::Closed,
            epoch: 0,
            attempts: 0,
            read_failures: 0,
            known_size: None,
            pending_seek: None,
            assembler: LineAssembler::new(settings.max_message_size),
        }
    }

    pub fn id(&self) -> &StreamId {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> StreamState {
        match self.phase {
            Phase::Closed => StreamState::Closed,
            Phase::Opening => StreamState::Opening,
            Phase::RetryWait => StreamState::RetryWait,
            Phase::Open { .. } => StreamState::Open,
            Phase::Reading => StreamState::Reading,
            Phase::Dead => StreamState::Dead,
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.phase, Phase::Dead)
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Consecutive failed opens since the last successful one.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn known_size(&self) -> Option<u64> {
        self.known_size
    }

    /// Bytes of the line not yet terminated.
    pub fn pending_line(&self) -> &[u8] {
        self.assembler.pending()
    }

    /// Kick off the first open. Only meaningful from `Closed`.
    pub fn start(&mut self) -> Vec<Command<H>> {
        match self.phase {
            Phase::Closed => self.begin_open(),
            _ => Vec::new(),
        }
    }

    pub fn handle(&mut self, event: Event<H>) -> Vec<Command<H>> {
        if self.is_dead() {
            trace!(stream = %self.id, "event after stream gave up; ignored");
            return Vec::new();
        }
        match event {
            Event::Opened(result) => self.on_opened(result),
            Event::WatchFailed { epoch, error } => self.on_watch_failed(epoch, error),
            Event::Stat { epoch, result } => self.on_stat(epoch, result),
            Event::Read {
                epoch,
                handle,
                result,
            } => self.on_read(epoch, handle, result),
            Event::Changed { epoch, change } => self.on_change(epoch, change),
            Event::RetryElapsed => self.on_retry_elapsed(),
            Event::ReadRetryElapsed { epoch } => self.on_read_retry(epoch),
        }
    }

    // -----------------------------------------------------------------------
    // Open / retry
    // -----------------------------------------------------------------------

    fn begin_open(&mut self) -> Vec<Command<H>> {
        self.epoch += 1;
        self.phase = Phase::Opening;
        debug!(stream = %self.id, path = %self.path.display(), epoch = self.epoch, "opening file");
        vec![Command::Open]
    }

    fn on_opened(&mut self, result: Result<H, StreamError>) -> Vec<Command<H>> {
        if !matches!(self.phase, Phase::Opening) {
            debug!(stream = %self.id, "open completed outside Opening; ignored");
            return Vec::new();
        }
        match result {
            Ok(handle) => {
                info!(stream = %self.id, path = %self.path.display(), "file opened");
                self.attempts = 0;
                self.read_failures = 0;
                self.phase = Phase::Open { handle };
                vec![
                    Command::Watch { epoch: self.epoch },
                    Command::Stat { epoch: self.epoch },
                ]
            }
            Err(error) => self.open_failed(&error),
        }
    }

    fn on_watch_failed(&mut self, epoch: Epoch, error: StreamError) -> Vec<Command<H>> {
        if epoch != self.epoch || !self.is_attached() {
            return Vec::new();
        }
        // The handle (if not out on a read) is dropped here; an in-flight
        // read returns it stale and it is dropped then.
        self.phase = Phase::Closed;
        // Same file, fresh handle: the next open tails again from the end.
        self.known_size = None;
        self.pending_seek = None;
        self.open_failed(&error)
    }

    fn open_failed(&mut self, error: &StreamError) -> Vec<Command<H>> {
        self.attempts += 1;
        warn!(
            stream = %self.id,
            path = %self.path.display(),
            attempt = self.attempts,
            max_attempts = self.settings.max_attempts,
            error = %error,
            "error opening file",
        );
        if self.attempts >= self.settings.max_attempts {
            warn!(stream = %self.id, path = %self.path.display(), "reached max open attempts; giving up");
            self.phase = Phase::Dead;
            return Vec::new();
        }
        self.phase = Phase::RetryWait;
        vec![Command::ScheduleRetry(self.settings.retry_delay)]
    }

    fn on_retry_elapsed(&mut self) -> Vec<Command<H>> {
        match self.phase {
            Phase::RetryWait => self.begin_open(),
            _ => {
                debug!(stream = %self.id, "retry timer fired outside RetryWait; ignored");
                Vec::new()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Change notifications
    // -----------------------------------------------------------------------

    fn on_change(&mut self, epoch: Epoch, change: Change) -> Vec<Command<H>> {
        if epoch != self.epoch || !self.is_attached() {
            trace!(stream = %self.id, epoch, "stale change notification");
            return Vec::new();
        }
        match change {
            Change::Content => vec![Command::Stat { epoch }],
            Change::Other { path_exists: true } => Vec::new(),
            Change::Other { path_exists: false } => {
                warn!(stream = %self.id, path = %self.path.display(), "file deleted, attempting to re-open");
                // Attempts are not reset here; only a successful open does that.
                let mut commands = vec![Command::Unwatch];
                commands.extend(self.begin_open());
                commands
            }
        }
    }

    // -----------------------------------------------------------------------
    // Stat / seek policy
    // -----------------------------------------------------------------------

    fn on_stat(&mut self, epoch: Epoch, result: Result<u64, StreamError>) -> Vec<Command<H>> {
        if epoch != self.epoch || !self.is_attached() {
            return Vec::new();
        }
        let size = match result {
            Ok(size) => size,
            Err(error) => {
                warn!(stream = %self.id, error = %error, "stat failed");
                return Vec::new();
            }
        };
        match self.known_size {
            // First stat: tail from the current end, never replay.
            None => self.pending_seek = Some(size),
            Some(known) if size < known => {
                info!(stream = %self.id, known, size, "file shrank; reading from start");
                self.pending_seek = Some(0);
            }
            Some(_) => {}
        }
        self.known_size = Some(size);
        self.try_read()
    }

    // -----------------------------------------------------------------------
    // Read
    // -----------------------------------------------------------------------

    fn try_read(&mut self) -> Vec<Command<H>> {
        match mem::replace(&mut self.phase, Phase::Reading) {
            Phase::Open { handle } => vec![Command::Read {
                epoch: self.epoch,
                handle,
                seek: self.pending_seek.take(),
                len: self.settings.read_len(),
            }],
            Phase::Reading => {
                trace!(stream = %self.id, "read already in flight; trigger dropped");
                Vec::new()
            }
            other => {
                self.phase = other;
                Vec::new()
            }
        }
    }

    fn on_read(
        &mut self,
        epoch: Epoch,
        handle: H,
        result: Result<Vec<u8>, StreamError>,
    ) -> Vec<Command<H>> {
        let current = epoch == self.epoch && matches!(self.phase, Phase::Reading);
        let mut commands = Vec::new();

        let full = match &result {
            Ok(bytes) => {
                commands.extend(self.assemble(bytes));
                bytes.len() == self.settings.read_len()
            }
            Err(error) => {
                warn!(stream = %self.id, path = %self.path.display(), error = %error, "read error");
                false
            }
        };

        if !current {
            // Stale read from a previous open: its bytes were real file
            // content, but the handle is released here.
            drop(handle);
            return commands;
        }

        self.phase = Phase::Open { handle };
        match result {
            Ok(_) => {
                self.read_failures = 0;
                if full || self.pending_seek.is_some() {
                    commands.extend(self.try_read());
                }
            }
            Err(_) => {
                self.read_failures += 1;
                if self.read_failures < self.settings.max_attempts {
                    commands.push(Command::ScheduleReadRetry {
                        epoch,
                        delay: self.settings.retry_delay,
                    });
                } else {
                    warn!(
                        stream = %self.id,
                        failures = self.read_failures,
                        "read keeps failing; waiting for the next change notification",
                    );
                }
            }
        }
        commands
    }

    fn on_read_retry(&mut self, epoch: Epoch) -> Vec<Command<H>> {
        if epoch != self.epoch || !self.is_attached() {
            return Vec::new();
        }
        vec![Command::Stat { epoch }]
    }

    fn assemble(&mut self, bytes: &[u8]) -> Vec<Command<H>> {
        self.assembler
            .feed(bytes)
            .into_iter()
            .map(|line| match dispatch(&self.id, &line) {
                Dispatch::Deliver(message) => Command::Deliver(message),
                Dispatch::Shutdown => {
                    info!(stream = %self.id, "exit requested in-band");
                    Command::Shutdown
                }
            })
            .collect()
    }

    /// Holding an open handle, either idle or lent to a read.
    fn is_attached(&self) -> bool {
        matches!(self.phase, Phase::Open { .. } | Phase::Reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, PartialEq, Eq)]
    struct Fd(u32);

    const READ_LEN: usize = 15;

    fn settings() -> StreamSettings {
        StreamSettings {
            max_attempts: 3,
            retry_delay: Duration::from_millis(50),
            max_buffer_size: READ_LEN + 1,
            max_message_size: 1024,
        }
    }

    fn stream() -> Stream<Fd> {
        Stream::new(StreamId::from("app"), "/var/log/app.log", settings())
    }

    fn not_found() -> StreamError {
        StreamError::Io {
            path: PathBuf::from("/var/log/app.log"),
            source: io::Error::from(io::ErrorKind::NotFound),
        }
    }

    /// Drive a fresh stream to `Open` with the first stat applied.
    fn opened_at(size: u64) -> (Stream<Fd>, Option<u64>) {
        let mut s = stream();
        s.start();
        let commands = s.handle(Event::Opened(Ok(Fd(3))));
        assert!(matches!(commands[..], [Command::Watch { .. }, Command::Stat { .. }]));
        let epoch = s.epoch();
        let commands = s.handle(Event::Stat { epoch, result: Ok(size) });
        let seek = match commands.into_iter().next() {
            Some(Command::Read { handle, seek, .. }) => {
                // Hand the handle straight back with nothing read.
                s.handle(Event::Read { epoch, handle, result: Ok(Vec::new()) });
                seek
            }
            other => panic!("expected read, got {other:?}"),
        };
        assert_eq!(s.state(), StreamState::Open);
        (s, seek)
    }

    fn take_read(commands: Vec<Command<Fd>>) -> (Fd, Option<u64>, usize) {
        let mut reads = commands.into_iter().filter_map(|c| match c {
            Command::Read { handle, seek, len, .. } => Some((handle, seek, len)),
            _ => None,
        });
        let read = reads.next().expect("a read command");
        assert!(reads.next().is_none(), "at most one read may be issued");
        read
    }

    fn delivered(commands: &[Command<Fd>]) -> Vec<&str> {
        commands
            .iter()
            .filter_map(|c| match c {
                Command::Deliver(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_issues_open_from_closed() {
        let mut s = stream();
        assert_eq!(s.state(), StreamState::Closed);
        assert!(matches!(s.start()[..], [Command::Open]));
        assert_eq!(s.state(), StreamState::Opening);
        assert!(s.start().is_empty(), "start is a no-op once running");
    }

    #[test]
    fn open_failures_retry_then_give_up_after_max_attempts() {
        let mut s = stream();
        let mut opens = s.start().len();
        let mut delays = Vec::new();

        loop {
            let commands = s.handle(Event::Opened(Err(not_found())));
            match commands.as_slice() {
                [Command::ScheduleRetry(delay)] => {
                    delays.push(*delay);
                    assert_eq!(s.state(), StreamState::RetryWait);
                    let reopen = s.handle(Event::RetryElapsed);
                    assert!(matches!(reopen[..], [Command::Open]));
                    opens += 1;
                }
                [] => break,
                other => panic!("unexpected commands: {other:?}"),
            }
        }

        assert_eq!(opens, 3, "exactly max_attempts opens are issued");
        assert_eq!(delays, vec![Duration::from_millis(50); 2]);
        assert_eq!(s.state(), StreamState::Dead);
        assert!(s.handle(Event::RetryElapsed).is_empty());
        assert!(s.handle(Event::Opened(Ok(Fd(9)))).is_empty());
    }

    #[test]
    fn successful_open_resets_attempts() {
        let mut s = stream();
        s.start();
        s.handle(Event::Opened(Err(not_found())));
        s.handle(Event::RetryElapsed);
        s.handle(Event::Opened(Err(not_found())));
        assert_eq!(s.attempts(), 2);
        s.handle(Event::RetryElapsed);
        s.handle(Event::Opened(Ok(Fd(3))));
        assert_eq!(s.attempts(), 0);
        assert_eq!(s.state(), StreamState::Open);
    }

    #[test]
    fn first_stat_seeks_to_end_so_existing_content_is_skipped() {
        let (s, seek) = opened_at(1000);
        assert_eq!(seek, Some(1000));
        assert_eq!(s.known_size(), Some(1000));
    }

    #[test]
    fn shrinking_file_reads_from_start() {
        let (mut s, _) = opened_at(1000);
        let epoch = s.epoch();
        let (_, seek, _) = take_read(s.handle(Event::Stat { epoch, result: Ok(10) }));
        assert_eq!(seek, Some(0));
        assert_eq!(s.known_size(), Some(10));
    }

    #[test]
    fn growing_file_reads_from_current_position() {
        let (mut s, _) = opened_at(100);
        let epoch = s.epoch();
        let (_, seek, len) = take_read(s.handle(Event::Stat { epoch, result: Ok(150) }));
        assert_eq!(seek, None);
        assert_eq!(len, READ_LEN);
    }

    #[test]
    fn lines_are_delivered_and_partial_line_is_held() {
        let (mut s, _) = opened_at(0);
        let epoch = s.epoch();
        let (handle, _, _) = take_read(s.handle(Event::Stat { epoch, result: Ok(11) }));
        let commands = s.handle(Event::Read {
            epoch,
            handle,
            result: Ok(b"hello\nworld".to_vec()),
        });
        assert_eq!(delivered(&commands), vec!["app hello\n"]);
        assert_eq!(s.pending_line(), b"world");
        assert!(
            !commands.iter().any(|c| matches!(c, Command::Read { .. })),
            "a short read waits for the next notification"
        );
    }

    #[test]
    fn full_read_immediately_reads_again() {
        let (mut s, _) = opened_at(0);
        let epoch = s.epoch();
        let (handle, _, len) = take_read(s.handle(Event::Stat { epoch, result: Ok(40) }));
        let commands = s.handle(Event::Read {
            epoch,
            handle,
            result: Ok(vec![b'x'; len]),
        });
        let (_, seek, _) = take_read(commands);
        assert_eq!(seek, None);
        assert_eq!(s.state(), StreamState::Reading);
    }

    #[test]
    fn second_trigger_during_read_is_dropped() {
        let (mut s, _) = opened_at(0);
        let epoch = s.epoch();
        let (handle, _, _) = take_read(s.handle(Event::Stat { epoch, result: Ok(5) }));

        let stat = s.handle(Event::Changed { epoch, change: Change::Content });
        assert!(matches!(stat[..], [Command::Stat { .. }]));
        let dropped = s.handle(Event::Stat { epoch, result: Ok(8) });
        assert!(dropped.is_empty(), "no second read while busy");

        let after = s.handle(Event::Read { epoch, handle, result: Ok(b"abcde".to_vec()) });
        assert!(!after.iter().any(|c| matches!(c, Command::Read { .. })));
        assert_eq!(s.state(), StreamState::Open);
    }

    #[test]
    fn truncation_seen_during_read_is_applied_by_the_follow_up_read() {
        let (mut s, _) = opened_at(1000);
        let epoch = s.epoch();
        let (handle, _, _) = take_read(s.handle(Event::Stat { epoch, result: Ok(1010) }));
        assert!(s.handle(Event::Stat { epoch, result: Ok(10) }).is_empty());

        let commands = s.handle(Event::Read { epoch, handle, result: Ok(b"stale\n".to_vec()) });
        let (_, seek, _) = take_read(commands);
        assert_eq!(seek, Some(0));
    }

    #[test]
    fn exit_line_requests_shutdown_instead_of_delivery() {
        let (mut s, _) = opened_at(0);
        let epoch = s.epoch();
        let (handle, _, _) = take_read(s.handle(Event::Stat { epoch, result: Ok(9) }));
        let commands = s.handle(Event::Read { epoch, handle, result: Ok(b"a\nExIt\nb\n".to_vec()) });
        assert_eq!(delivered(&commands), vec!["app a\n", "app b\n"]);
        assert_eq!(
            commands.iter().filter(|c| matches!(c, Command::Shutdown)).count(),
            1
        );
    }

    #[test]
    fn read_error_schedules_bounded_retries() {
        let (mut s, _) = opened_at(0);
        let epoch = s.epoch();
        let read_error = || StreamError::Io {
            path: PathBuf::from("/var/log/app.log"),
            source: io::Error::new(io::ErrorKind::Other, "EIO"),
        };

        let mut retries = 0;
        let (mut handle, _, _) = take_read(s.handle(Event::Stat { epoch, result: Ok(1) }));
        loop {
            let commands = s.handle(Event::Read { epoch, handle, result: Err(read_error()) });
            assert!(delivered(&commands).is_empty());
            assert_eq!(s.state(), StreamState::Open, "busy is cleared after a failed read");
            match commands.as_slice() {
                [Command::ScheduleReadRetry { delay, .. }] => {
                    assert_eq!(*delay, Duration::from_millis(50));
                    retries += 1;
                    let stat = s.handle(Event::ReadRetryElapsed { epoch });
                    assert!(matches!(stat[..], [Command::Stat { .. }]));
                    (handle, _, _) = take_read(s.handle(Event::Stat { epoch, result: Ok(1) }));
                }
                [] => break,
                other => panic!("unexpected commands: {other:?}"),
            }
        }
        assert_eq!(retries, 2);

        // A change notification still revives the stream.
        let stat = s.handle(Event::Changed { epoch, change: Change::Content });
        assert!(matches!(stat[..], [Command::Stat { .. }]));
    }

    #[test]
    fn deletion_unwatches_and_reopens_without_resetting_attempts() {
        let (mut s, _) = opened_at(100);
        let epoch = s.epoch();

        let commands = s.handle(Event::Changed {
            epoch,
            change: Change::Other { path_exists: false },
        });
        assert!(matches!(commands[..], [Command::Unwatch, Command::Open]));
        assert_eq!(s.state(), StreamState::Opening);
        assert_eq!(s.epoch(), epoch + 1);

        // The recreated file is slow to appear: the reopen path shares the
        // same failure budget as any other open.
        s.handle(Event::Opened(Err(not_found())));
        assert_eq!(s.attempts(), 1);
        s.handle(Event::RetryElapsed);
        s.handle(Event::Opened(Err(not_found())));
        s.handle(Event::RetryElapsed);
        s.handle(Event::Opened(Err(not_found())));
        assert_eq!(s.state(), StreamState::Dead);
    }

    #[test]
    fn recreated_file_is_read_from_its_start() {
        let (mut s, _) = opened_at(100);
        let epoch = s.epoch();
        s.handle(Event::Changed { epoch, change: Change::Other { path_exists: false } });
        s.handle(Event::Opened(Ok(Fd(4))));
        let epoch = s.epoch();

        // Larger than before: no seek, the fresh handle starts at offset 0.
        let (handle, seek, _) = take_read(s.handle(Event::Stat { epoch, result: Ok(200) }));
        assert_eq!(seek, None);
        assert_eq!(handle, Fd(4));
    }

    #[test]
    fn metadata_change_on_existing_path_is_ignored() {
        let (mut s, _) = opened_at(0);
        let epoch = s.epoch();
        let commands = s.handle(Event::Changed { epoch, change: Change::Other { path_exists: true } });
        assert!(commands.is_empty());
        assert_eq!(s.state(), StreamState::Open);
    }

    #[test]
    fn stale_events_from_a_previous_open_are_ignored() {
        let (mut s, _) = opened_at(0);
        let old = s.epoch();
        let (handle, _, _) = take_read(s.handle(Event::Stat { epoch: old, result: Ok(6) }));
        s.handle(Event::Changed { epoch: old, change: Change::Other { path_exists: false } });
        s.handle(Event::Opened(Ok(Fd(4))));

        assert!(s.handle(Event::Changed { epoch: old, change: Change::Content }).is_empty());
        assert!(s.handle(Event::Stat { epoch: old, result: Ok(1) }).is_empty());

        // The stale read still delivers what it read, but does not reattach.
        let commands = s.handle(Event::Read { epoch: old, handle, result: Ok(b"last\n".to_vec()) });
        assert_eq!(delivered(&commands), vec!["app last\n"]);
        assert_eq!(s.state(), StreamState::Open);
    }

    #[test]
    fn watch_failure_is_treated_as_open_failure() {
        let mut s = stream();
        s.start();
        s.handle(Event::Opened(Ok(Fd(3))));
        let epoch = s.epoch();
        let error = StreamError::Watch {
            path: PathBuf::from("/var/log/app.log"),
            source: notify::Error::generic("inotify limit reached"),
        };
        let commands = s.handle(Event::WatchFailed { epoch, error });
        assert!(matches!(commands[..], [Command::ScheduleRetry(_)]));
        assert_eq!(s.attempts(), 1);
        assert_eq!(s.state(), StreamState::RetryWait);
    }

    #[test]
    fn reopen_after_watch_failure_tails_from_the_end() {
        let (mut s, seek) = opened_at(1000);
        assert_eq!(seek, Some(1000));
        let epoch = s.epoch();
        let error = StreamError::Watch {
            path: PathBuf::from("/var/log/app.log"),
            source: notify::Error::generic("inotify limit reached"),
        };
        s.handle(Event::WatchFailed { epoch, error });
        assert!(matches!(s.handle(Event::RetryElapsed)[..], [Command::Open]));
        s.handle(Event::Opened(Ok(Fd(4))));
        let epoch = s.epoch();

        let (handle, seek, _) = take_read(s.handle(Event::Stat { epoch, result: Ok(1000) }));
        assert_eq!(handle, Fd(4));
        assert_eq!(seek, Some(1000), "content already in the file is not replayed");
    }

    #[test]
    fn stray_retry_timer_is_ignored_while_open() {
        let (mut s, _) = opened_at(0);
        assert!(s.handle(Event::RetryElapsed).is_empty());
        assert_eq!(s.state(), StreamState::Open);
    }
}
