//! Command handler functions for the covset CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::model::Snapshot;
use crate::report::TextFormatter;
use crate::result::{CoverageResult, FsExistence, Resultset};
use crate::store;

/// Read a raw coverage snapshot, wrap it as a result for the given
/// command name, and record it into the resultset file.
pub fn cmd_record(coverage_file: &Path, name: &str, resultset: &Path) -> Result<String> {
    let content = std::fs::read_to_string(coverage_file)
        .with_context(|| format!("Failed to read {}", coverage_file.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&content)
        .with_context(|| format!("Invalid coverage JSON in {}", coverage_file.display()))?;

    let total = snapshot.len();
    let result = CoverageResult::new(snapshot, name);
    let kept = result.files().len();

    store::store_result(resultset, &result)
        .with_context(|| format!("Failed to write {}", resultset.display()))?;

    Ok(format!(
        "Recorded '{}' → {} ({} of {} files exist)\n",
        name,
        resultset.display(),
        kept,
        total,
    ))
}

/// Combine the runs from one or more resultset files into a single entry
/// written to `out`.
pub fn cmd_merge(inputs: &[PathBuf], out: &Path, name: Option<&str>) -> Result<String> {
    let mut runs = Resultset::new();
    for input in inputs {
        let set = store::read_resultset(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        runs.extend(set);
    }
    let run_count = runs.len();

    let mut merged = store::merged_result(&runs, &FsExistence)?
        .ok_or_else(|| anyhow::anyhow!("No runs found in input resultsets"))?;
    if let Some(name) = name {
        merged.command_name = name.to_string();
    }

    store::write_resultset(out, &merged.to_persistable())
        .with_context(|| format!("Failed to write {}", out.display()))?;

    Ok(format!(
        "Merged {} runs into '{}' → {}\n",
        run_count,
        merged.command_name,
        out.display(),
    ))
}

/// Print the formatted report for all runs in a resultset, merged.
pub fn cmd_report(resultset: &Path) -> Result<String> {
    let mut config = Config::new();
    config.set_formatter(Box::new(TextFormatter));

    let set = store::read_resultset(resultset)
        .with_context(|| format!("Failed to read {}", resultset.display()))?;
    let result = store::merged_result(&set, &FsExistence)?
        .ok_or_else(|| anyhow::anyhow!("No runs found in {}", resultset.display()))?;

    Ok(config.formatter()?.format(&result))
}
