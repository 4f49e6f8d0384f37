//! `tailward check`: validate and summarise the configuration.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use tailward_core::Config;

use super::ConfigArgs;

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let (path, config) = self.config.load()?;
        let report = build_report(&path, &config);
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to render check JSON")?
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct CheckReport {
    config: String,
    sink: SinkJson,
    limits: LimitsJson,
    streams: Vec<StreamJson>,
}

#[derive(Serialize)]
struct SinkJson {
    endpoint: String,
    protocol: String,
    max_connect_attempts: u32,
    connect_retry_delay_ms: u64,
}

#[derive(Serialize)]
struct LimitsJson {
    max_open_attempts: u32,
    open_retry_delay_ms: u64,
    max_buffer_size: usize,
    max_message_size: usize,
}

#[derive(Serialize)]
struct StreamJson {
    id: String,
    path: String,
}

fn build_report(path: &Path, config: &Config) -> CheckReport {
    let sink = config.sink_settings();
    CheckReport {
        config: path.display().to_string(),
        sink: SinkJson {
            endpoint: sink.endpoint(),
            protocol: sink.protocol.to_string(),
            max_connect_attempts: config.max_connect_attempts,
            connect_retry_delay_ms: config.connect_retry_delay_ms,
        },
        limits: LimitsJson {
            max_open_attempts: config.max_open_attempts,
            open_retry_delay_ms: config.open_retry_delay_ms,
            max_buffer_size: config.max_buffer_size,
            max_message_size: config.max_message_size,
        },
        streams: config
            .streams
            .iter()
            .map(|stream| StreamJson {
                id: stream.id.to_string(),
                path: stream.path.display().to_string(),
            })
            .collect(),
    }
}
