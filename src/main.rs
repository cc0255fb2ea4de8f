use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use covset::cli::{cmd_merge, cmd_record, cmd_report};

/// covset — Combine coverage results from independent test runs.
#[derive(Parser)]
#[command(name = "covset", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a raw coverage snapshot into a resultset file.
    Record {
        /// Path to the raw coverage JSON (file path to lines/branches).
        file: PathBuf,

        /// Command name identifying this run.
        #[arg(long)]
        name: String,

        /// Path to the resultset file.
        #[arg(long, default_value = "coverage/.resultset.json")]
        resultset: PathBuf,
    },

    /// Combine runs from one or more resultset files into a single entry.
    Merge {
        /// Input resultset files.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output resultset file.
        #[arg(long)]
        out: PathBuf,

        /// Name for the merged entry (default: the joined run names).
        #[arg(long)]
        name: Option<String>,
    },

    /// Print a coverage report for a resultset, merged across its runs.
    Report {
        /// Path to the resultset file.
        #[arg(long, default_value = "coverage/.resultset.json")]
        resultset: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Record {
            file,
            name,
            resultset,
        } => cmd_record(&file, &name, &resultset)?,
        Commands::Merge { inputs, out, name } => cmd_merge(&inputs, &out, name.as_deref())?,
        Commands::Report { resultset } => cmd_report(&resultset)?,
    };

    print!("{output}");
    Ok(())
}
