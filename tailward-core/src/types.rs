//! Domain types for the tailward configuration.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! All types are serializable/deserializable via serde + serde_yaml.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 514;
pub const DEFAULT_MAX_OPEN_ATTEMPTS: u32 = 10;
pub const DEFAULT_OPEN_RETRY_DELAY_MS: u64 = 5_000;
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 4096;
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024;
pub const DEFAULT_MAX_CONNECT_ATTEMPTS: u32 = 10;
pub const DEFAULT_CONNECT_RETRY_DELAY_MS: u64 = 5_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Prefix attached verbatim to every message a stream emits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(pub String);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for StreamId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StreamId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Transport used by the delivery sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
        }
    }
}

/// Output format of the process log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// One watched file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub id: StreamId,
    /// Absolute path of the file being tailed.
    pub path: PathBuf,
}

/// Root of the YAML configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default = "default_max_open_attempts")]
    pub max_open_attempts: u32,
    #[serde(default = "default_open_retry_delay_ms")]
    pub open_retry_delay_ms: u64,
    #[serde(default = "default_max_buffer_size")]
    pub max_buffer_size: usize,
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    #[serde(default = "default_max_connect_attempts")]
    pub max_connect_attempts: u32,
    #[serde(default = "default_connect_retry_delay_ms")]
    pub connect_retry_delay_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pidfile: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    pub streams: Vec<StreamConfig>,
}

impl Config {
    /// A config with every default filled in and the given streams.
    pub fn with_streams(streams: Vec<StreamConfig>) -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            protocol: Protocol::default(),
            max_open_attempts: DEFAULT_MAX_OPEN_ATTEMPTS,
            open_retry_delay_ms: DEFAULT_OPEN_RETRY_DELAY_MS,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_connect_attempts: DEFAULT_MAX_CONNECT_ATTEMPTS,
            connect_retry_delay_ms: DEFAULT_CONNECT_RETRY_DELAY_MS,
            pidfile: None,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            streams,
        }
    }

    /// The per-stream limits every stream state machine is built with.
    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            max_attempts: self.max_open_attempts,
            retry_delay: Duration::from_millis(self.open_retry_delay_ms),
            max_buffer_size: self.max_buffer_size,
            max_message_size: self.max_message_size,
        }
    }

    /// Connection settings handed to the delivery sink.
    pub fn sink_settings(&self) -> SinkSettings {
        SinkSettings {
            host: self.host.clone(),
            port: self.port,
            protocol: self.protocol,
            max_connect_attempts: self.max_connect_attempts,
            connect_retry_delay: Duration::from_millis(self.connect_retry_delay_ms),
        }
    }
}

/// Limits consumed by a single stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub max_buffer_size: usize,
    pub max_message_size: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_OPEN_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_OPEN_RETRY_DELAY_MS),
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl StreamSettings {
    /// Bytes requested by a single read.
    pub fn read_len(&self) -> usize {
        self.max_buffer_size.saturating_sub(1)
    }
}

/// Where and how formatted messages are shipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSettings {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub max_connect_attempts: u32,
    pub connect_retry_delay: Duration,
}

impl SinkSettings {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_open_attempts() -> u32 {
    DEFAULT_MAX_OPEN_ATTEMPTS
}

fn default_open_retry_delay_ms() -> u64 {
    DEFAULT_OPEN_RETRY_DELAY_MS
}

fn default_max_buffer_size() -> usize {
    DEFAULT_MAX_BUFFER_SIZE
}

fn default_max_message_size() -> usize {
    DEFAULT_MAX_MESSAGE_SIZE
}

fn default_max_connect_attempts() -> u32 {
    DEFAULT_MAX_CONNECT_ATTEMPTS
}

fn default_connect_retry_delay_ms() -> u64 {
    DEFAULT_CONNECT_RETRY_DELAY_MS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_id_display() {
        assert_eq!(StreamId::from("nginx.access").to_string(), "nginx.access");
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let yaml = "streams:\n  - id: app\n    path: /var/log/app.log\n";
        let config: Config = serde_yaml::from_str(yaml).expect("deserialize");
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.protocol, Protocol::Tcp);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config, Config::with_streams(config.streams.clone()));
    }

    #[test]
    fn stream_settings_follow_config() {
        let mut config = Config::with_streams(vec![]);
        config.max_open_attempts = 3;
        config.open_retry_delay_ms = 50;
        config.max_buffer_size = 16;
        let settings = config.stream_settings();
        assert_eq!(settings.max_attempts, 3);
        assert_eq!(settings.retry_delay, Duration::from_millis(50));
        assert_eq!(settings.read_len(), 15);
    }

    #[test]
    fn protocol_parses_lowercase() {
        let protocol: Protocol = serde_yaml::from_str("udp").expect("protocol");
        assert_eq!(protocol, Protocol::Udp);
        assert_eq!(protocol.to_string(), "udp");
    }

    #[test]
    fn sink_endpoint_joins_host_and_port() {
        let config = Config::with_streams(vec![]);
        assert_eq!(config.sink_settings().endpoint(), "127.0.0.1:514");
    }
}
