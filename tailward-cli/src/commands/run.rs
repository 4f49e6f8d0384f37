//! `tailward run`: foreground forwarder.

use anyhow::{Context, Result};
use clap::Args;

use super::ConfigArgs;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let (_, config) = self.config.load()?;
        tailward_daemon::start_blocking(config).context("forwarder exited with error")
    }
}
