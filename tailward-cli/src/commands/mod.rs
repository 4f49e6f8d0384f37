pub mod check;
pub mod run;
pub mod streams;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tailward_core::{config, Config};

/// `--config` flag shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Configuration file [default: ~/.tailward/config.yaml].
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    /// Resolve the config path and load it, validation included.
    pub fn load(&self) -> Result<(PathBuf, Config)> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => config::config_path().context("could not determine home directory")?,
        };
        let config = config::load_from(&path)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok((path, config))
    }
}
