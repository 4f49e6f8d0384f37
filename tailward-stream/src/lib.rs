//! File-stream engine: tails files, survives truncation and deletion, and
//! forwards each completed line to a delivery sink.
//!
//! - [`assembler`]: newline framing with a message-size cap
//! - [`machine`]: the per-file state machine (no I/O)
//! - [`driver`]: runs a machine on the tokio reactor
//! - [`watcher`]: `notify` subscription feeding change events
//! - [`message`]: `exit` handling and the [`Sink`] boundary
//! - [`registry`]: one stream per configured file

pub mod assembler;
pub mod driver;
mod error;
pub mod machine;
pub mod message;
pub mod registry;
pub mod watcher;

pub use assembler::LineAssembler;
pub use driver::run_stream;
pub use error::StreamError;
pub use machine::{Change, Command, Epoch, Event, Stream, StreamState};
pub use message::{dispatch, format_message, Dispatch, Sink, EXIT_COMMAND};
pub use registry::StreamRegistry;
