//! Run configuration supplied explicitly by the caller.
//!
//! Defaults live here rather than in process-wide state; anything a
//! result or the reporting step needs is read from a `Config` the caller
//! built.

use std::path::{Path, PathBuf};

use crate::error::{CovsetError, Result};
use crate::report::Formatter;

/// Resultset file name inside the coverage directory.
pub const RESULTSET_FILE: &str = ".resultset.json";

#[derive(Default)]
pub struct Config {
    command_name: Option<String>,
    formatter: Option<Box<dyn Formatter>>,
    root: Option<PathBuf>,
    coverage_dir: Option<String>,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_command_name(&mut self, name: impl Into<String>) {
        self.command_name = Some(name.into());
    }

    pub fn set_formatter(&mut self, formatter: Box<dyn Formatter>) {
        self.formatter = Some(formatter);
    }

    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.root = Some(root.into());
    }

    pub fn set_coverage_dir(&mut self, dir: impl Into<String>) {
        self.coverage_dir = Some(dir.into());
    }

    /// The configured command name, required before a result can be
    /// recorded.
    pub fn command_name(&self) -> Result<&str> {
        self.command_name.as_deref().ok_or_else(|| {
            CovsetError::Configuration(
                "No command name configured. Set one with set_command_name.".to_string(),
            )
        })
    }

    /// The configured formatter, required by the reporting step.
    pub fn formatter(&self) -> Result<&dyn Formatter> {
        self.formatter.as_deref().ok_or_else(|| {
            CovsetError::Configuration(
                "No formatter configured. Set one with set_formatter.".to_string(),
            )
        })
    }

    /// Project root. Defaults to the current directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// Output and cache directory name, relative to the root. Defaults to
    /// "coverage".
    #[must_use]
    pub fn coverage_dir(&self) -> &str {
        self.coverage_dir.as_deref().unwrap_or("coverage")
    }

    /// Full path to the output directory.
    #[must_use]
    pub fn coverage_path(&self) -> PathBuf {
        self.root().join(self.coverage_dir())
    }

    /// Full path to the resultset file.
    #[must_use]
    pub fn resultset_path(&self) -> PathBuf {
        self.coverage_path().join(RESULTSET_FILE)
    }
}
