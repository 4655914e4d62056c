//! Export command - Write the learned value table to a file

use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::{app::App, cli::output::format_number};

#[derive(Parser, Debug)]
#[command(about = "Export the value table in various formats")]
pub struct ExportArgs {
    /// SQLite database holding identities and values
    #[arg(long)]
    pub db: PathBuf,

    /// Output file path
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Export format
    #[arg(long, short = 'f', value_enum, default_value = "csv")]
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// One row per (state, action) with decoded features
    Csv,
    /// Versioned snapshot that `InMemoryStore::from_snapshot` can reload
    Msgpack,
}

pub fn execute(args: ExportArgs) -> Result<()> {
    let app = App::open(&args.db)
        .with_context(|| format!("Failed to open store {}", args.db.display()))?;

    match args.format {
        ExportFormat::Csv => {
            let snapshot = app.snapshot()?;
            let file = File::create(&args.output)
                .with_context(|| format!("Failed to create {}", args.output.display()))?;
            snapshot.write_csv(BufWriter::new(file))?;
            println!(
                "✓ {} value entries exported to: {}",
                format_number(snapshot.values.len()),
                args.output.display()
            );
        }
        ExportFormat::Msgpack => {
            app.save_snapshot(&args.output)?;
            println!("✓ Snapshot exported to: {}", args.output.display());
        }
    }

    Ok(())
}
