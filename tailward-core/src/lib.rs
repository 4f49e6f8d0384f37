//! tailward core library: configuration types, loading, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes and config structs
//! - [`error`]: [`ConfigError`]
//! - [`config`]: locate / load / validate

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{
    Config, LogFormat, Protocol, SinkSettings, StreamConfig, StreamId, StreamSettings,
};
