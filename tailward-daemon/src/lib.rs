//! Process runtime: sinks, signal handling, pid file and tracing setup.

mod error;
pub mod pidfile;
mod runtime;
pub mod sink;

pub use error::DaemonError;
pub use pidfile::PidFile;
pub use runtime::{init_tracing, run, start_blocking};
