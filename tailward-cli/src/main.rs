//! tailward: forward lines appended to local files to a remote log sink.
//!
//! # Usage
//!
//! ```text
//! tailward run     [--config <path>]
//! tailward check   [--config <path>]
//! tailward streams [--config <path>] [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, run::RunArgs, streams::StreamsArgs};

#[derive(Parser, Debug)]
#[command(
    name = "tailward",
    version,
    about = "Tail log files and forward each new line to a remote sink",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the forwarder in the foreground until signalled or `exit` is read.
    Run(RunArgs),

    /// Validate the configuration and print the resolved settings as JSON.
    Check(CheckArgs),

    /// List configured streams and whether their files exist.
    Streams(StreamsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Check(args) => args.run(),
        Commands::Streams(args) => args.run(),
    }
}
