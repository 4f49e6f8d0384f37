//! Completed-line handling: the in-band `exit` control word and the hand-off
//! to the delivery sink.

use std::sync::Arc;

use tokio::sync::mpsc;

use tailward_core::StreamId;

/// A line equal to this word (any case) shuts the process down.
pub const EXIT_COMMAND: &str = "exit";

/// Destination for formatted messages.
///
/// Delivery is fire-and-forget: implementations own their connection
/// lifecycle and retries and report nothing back to the stream.
pub trait Sink: Send + Sync {
    fn submit(&self, message: String);
}

impl Sink for mpsc::UnboundedSender<String> {
    fn submit(&self, message: String) {
        if self.send(message).is_err() {
            tracing::debug!("sink channel closed; message dropped");
        }
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn submit(&self, message: String) {
        (**self).submit(message)
    }
}

/// What to do with one completed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Deliver(String),
    Shutdown,
}

/// Route a completed line: control word or `"<id> <line>\n"` for the sink.
pub fn dispatch(id: &StreamId, line: &str) -> Dispatch {
    if line.eq_ignore_ascii_case(EXIT_COMMAND) {
        Dispatch::Shutdown
    } else {
        Dispatch::Deliver(format_message(id, line))
    }
}

pub fn format_message(id: &StreamId, line: &str) -> String {
    format!("{id} {line}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_is_prefixed_and_terminated() {
        let id = StreamId::from("nginx.access");
        assert_eq!(
            dispatch(&id, "GET / 200"),
            Dispatch::Deliver("nginx.access GET / 200\n".to_string())
        );
    }

    #[test]
    fn exit_in_any_case_requests_shutdown() {
        let id = StreamId::from("app");
        for word in ["exit", "EXIT", "Exit", "eXiT"] {
            assert_eq!(dispatch(&id, word), Dispatch::Shutdown, "word: {word}");
        }
    }

    #[test]
    fn exit_inside_a_longer_line_is_delivered() {
        let id = StreamId::from("app");
        assert_eq!(
            dispatch(&id, "exit code 1"),
            Dispatch::Deliver("app exit code 1\n".to_string())
        );
        assert!(matches!(dispatch(&id, " exit"), Dispatch::Deliver(_)));
    }

    #[test]
    fn channel_sink_forwards_messages() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink: Arc<dyn Sink> = Arc::new(tx);
        sink.submit("app hello\n".to_string());
        assert_eq!(rx.try_recv().expect("message"), "app hello\n");
    }
}
