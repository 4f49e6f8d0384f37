//! YAML configuration loading and validation.
//!
//! # Storage layout
//!
//! ```text
//! ~/.tailward/
//!   config.yaml     (default location; `--config` overrides)
//! ```
//!
//! # API pattern
//!
//! Every function touching the home directory has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{io_err, ConfigError};
use crate::types::Config;

pub const CONFIG_DIR: &str = ".tailward";
pub const CONFIG_FILE: &str = "config.yaml";

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.tailward/config.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// `config_path_at` convenience wrapper.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_path_at(&home()?))
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Read, parse and validate the config file at `path`.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let config = parse(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load `<home>/.tailward/config.yaml`.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    load_from(&config_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

/// Parse without validating.
pub fn parse(contents: &str) -> Result<Config, serde_yaml::Error> {
    serde_yaml::from_str(contents)
}

// ---------------------------------------------------------------------------
// 3. Validate
// ---------------------------------------------------------------------------

/// Check the invariants the stream engine relies on.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "host",
            reason: "must not be empty".to_string(),
        });
    }
    if config.max_open_attempts == 0 {
        return Err(ConfigError::InvalidValue {
            field: "max_open_attempts",
            reason: "must be at least 1".to_string(),
        });
    }
    if config.max_connect_attempts == 0 {
        return Err(ConfigError::InvalidValue {
            field: "max_connect_attempts",
            reason: "must be at least 1".to_string(),
        });
    }
    // A read of `max_buffer_size - 1` bytes must request at least one byte.
    if config.max_buffer_size < 2 {
        return Err(ConfigError::InvalidValue {
            field: "max_buffer_size",
            reason: format!("must be at least 2, got {}", config.max_buffer_size),
        });
    }
    if config.max_message_size < 2 {
        return Err(ConfigError::InvalidValue {
            field: "max_message_size",
            reason: format!("must be at least 2, got {}", config.max_message_size),
        });
    }

    if config.streams.is_empty() {
        return Err(ConfigError::NoStreams);
    }
    let mut seen = HashSet::new();
    for (index, stream) in config.streams.iter().enumerate() {
        if stream.id.0.is_empty() {
            return Err(ConfigError::EmptyStreamId { index });
        }
        if !stream.path.is_absolute() {
            return Err(ConfigError::RelativePath {
                id: stream.id.0.clone(),
                path: stream.path.clone(),
            });
        }
        if !seen.insert(stream.id.0.as_str()) {
            return Err(ConfigError::DuplicateStreamId {
                id: stream.id.0.clone(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
