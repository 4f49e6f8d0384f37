//! `tailward streams`: configured streams and whether their files exist.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use tailward_core::StreamConfig;

use super::ConfigArgs;

#[derive(Args, Debug)]
pub struct StreamsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StreamsArgs {
    pub fn run(self) -> Result<()> {
        let (_, config) = self.config.load()?;
        let rows: Vec<StreamRow> = config.streams.iter().map(StreamRow::probe).collect();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to render streams JSON")?
            );
            return Ok(());
        }

        print_table(&rows);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StreamRow {
    id: String,
    path: String,
    exists: bool,
}

impl StreamRow {
    fn probe(stream: &StreamConfig) -> Self {
        Self {
            id: stream.id.to_string(),
            path: stream.path.display().to_string(),
            exists: stream.path.is_file(),
        }
    }
}

#[derive(Tabled)]
struct StreamTableRow {
    #[tabled(rename = "stream")]
    id: String,
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "file")]
    file: String,
}

fn print_table(rows: &[StreamRow]) {
    let missing = rows.iter().filter(|row| !row.exists).count();
    println!("{} streams | {} missing", rows.len(), missing);

    let table_rows = rows.iter().map(|row| StreamTableRow {
        id: row.id.clone(),
        path: row.path.clone(),
        file: if row.exists {
            "present".green().to_string()
        } else {
            "missing".red().bold().to_string()
        },
    });
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");
}
