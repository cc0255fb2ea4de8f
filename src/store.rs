//! Durable storage of coverage results.
//!
//! Results persist as a single JSON resultset file holding one entry per
//! command name, so independent runs can be recorded separately and
//! combined later.

use std::fs;
use std::path::Path;

use crate::combine;
use crate::error::Result;
use crate::model::Snapshot;
use crate::result::{datetime_from_timestamp, CoverageResult, ExistenceCheck, Resultset};

/// Read a resultset file. A missing or empty file yields an empty
/// resultset.
pub fn read_resultset(path: &Path) -> Result<Resultset> {
    if !path.exists() {
        return Ok(Resultset::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Resultset::new());
    }
    Ok(serde_json::from_str(&content)?)
}

/// Write a resultset file, creating parent directories as needed.
pub fn write_resultset(path: &Path, set: &Resultset) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(set)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

/// Record a result into the resultset file, replacing any previous entry
/// with the same command name.
pub fn store_result(path: &Path, result: &CoverageResult) -> Result<()> {
    let mut set = read_resultset(path)?;
    set.extend(result.to_persistable());
    write_resultset(path, &set)
}

/// Fold all stored runs into a single result, named by the joined command
/// names and stamped with the latest stored timestamp. Returns `None`
/// when the resultset holds no runs.
pub fn merged_result(
    set: &Resultset,
    check: &dyn ExistenceCheck,
) -> Result<Option<CoverageResult>> {
    if set.is_empty() {
        return Ok(None);
    }

    let snapshots: Vec<&Snapshot> = set.values().map(|run| &run.coverage).collect();
    let combined = combine::combine(snapshots.iter().copied());

    let command_name = set.keys().cloned().collect::<Vec<_>>().join(", ");
    let latest = set.values().map(|run| run.timestamp).max().unwrap_or(0);

    let mut result = CoverageResult::with_check(combined, command_name, check);
    result.created_at = datetime_from_timestamp(latest)?;
    Ok(Some(result))
}
