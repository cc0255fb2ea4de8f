//! A coverage result: one snapshot plus the metadata describing the run
//! that produced it, restricted to files that still exist.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CovsetError, Result};
use crate::model::{Snapshot, SourceFile};

/// Filesystem existence check consulted once per candidate file when a
/// result is constructed from a raw snapshot.
pub trait ExistenceCheck {
    fn exists(&self, path: &str) -> bool;
}

/// Checks the real filesystem.
pub struct FsExistence;

impl ExistenceCheck for FsExistence {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }
}

/// The persisted form of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRun {
    pub coverage: Snapshot,
    pub timestamp: i64,
}

/// The on-disk resultset layout: command name to stored run.
pub type Resultset = BTreeMap<String, StoredRun>;

/// One run's coverage result.
///
/// The raw snapshot is retained untouched for provenance. The filtered
/// `files` view is computed once at construction and is the only view
/// exposed to downstream consumers.
#[derive(Debug, Clone)]
pub struct CoverageResult {
    original: Snapshot,
    files: Vec<SourceFile>,
    /// Identifies the run that produced this result; used as the
    /// persistence key. Supplied by the caller's configuration.
    pub command_name: String,
    /// When this result was created. Stamped at construction, may be
    /// overridden afterwards.
    pub created_at: DateTime<Utc>,
}

impl CoverageResult {
    /// Wrap a raw snapshot, restricting it to files present on the real
    /// filesystem.
    pub fn new(original: Snapshot, command_name: impl Into<String>) -> Self {
        Self::with_check(original, command_name, &FsExistence)
    }

    /// Wrap a raw snapshot using the given existence check.
    pub fn with_check(
        original: Snapshot,
        command_name: impl Into<String>,
        check: &dyn ExistenceCheck,
    ) -> Self {
        let files = original
            .iter()
            .filter(|(path, _)| check.exists(path))
            .map(|(path, coverage)| SourceFile {
                filename: path.clone(),
                coverage: coverage.clone(),
            })
            .collect();

        CoverageResult {
            original,
            files,
            command_name: command_name.into(),
            created_at: Utc::now(),
        }
    }

    /// Files that passed the existence check, in filename order.
    #[must_use]
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// The raw snapshot this result was constructed from.
    #[must_use]
    pub fn original(&self) -> &Snapshot {
        &self.original
    }

    #[must_use]
    pub fn filenames(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.filename.as_str()).collect()
    }

    /// Serialize for durable storage, keyed by command name. The stored
    /// coverage is the original hit data restricted to the filtered view.
    #[must_use]
    pub fn to_persistable(&self) -> Resultset {
        let coverage: Snapshot = self
            .files
            .iter()
            .filter_map(|f| self.original.get_key_value(&f.filename))
            .map(|(path, record)| (path.clone(), record.clone()))
            .collect();

        let run = StoredRun {
            coverage,
            timestamp: self.created_at.timestamp(),
        };
        BTreeMap::from([(self.command_name.clone(), run)])
    }

    /// Restore a result from its stored form, re-applying existence
    /// filtering. Files that no longer exist are dropped; the command
    /// name and second-precision timestamp are preserved exactly.
    pub fn from_persistable(set: &Resultset, check: &dyn ExistenceCheck) -> Result<CoverageResult> {
        let (command_name, run) = set.iter().next().ok_or(CovsetError::EmptyResultset)?;
        let created_at = datetime_from_timestamp(run.timestamp)?;

        let mut result = CoverageResult::with_check(run.coverage.clone(), command_name, check);
        result.created_at = created_at;
        Ok(result)
    }
}

pub(crate) fn datetime_from_timestamp(timestamp: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| CovsetError::Other(format!("Invalid timestamp: {timestamp}")))
}
