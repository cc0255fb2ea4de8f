//! Uniform in-memory representation of coverage data, independent of which
//! test framework produced it. Combinators, results and the resultset
//! store all operate on these types.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Compute a coverage rate, returning 0.0 when the total is zero.
#[must_use]
pub fn rate(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// One position in a file's line coverage array.
///
/// A line is either not executable (blank line, comment) or executable
/// with a hit count. An executable line with zero hits is a miss; a
/// non-executable line is not, and the distinction survives merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum LineCell {
    NotExecutable,
    Hits(u64),
}

impl LineCell {
    /// Hit count, with non-executable lines counting as zero.
    #[must_use]
    pub fn hits(self) -> u64 {
        match self {
            LineCell::NotExecutable => 0,
            LineCell::Hits(n) => n,
        }
    }

    #[must_use]
    pub fn is_executable(self) -> bool {
        matches!(self, LineCell::Hits(_))
    }

    #[must_use]
    pub fn is_covered(self) -> bool {
        self.hits() > 0
    }
}

impl From<Option<u64>> for LineCell {
    fn from(value: Option<u64>) -> Self {
        match value {
            None => LineCell::NotExecutable,
            Some(n) => LineCell::Hits(n),
        }
    }
}

impl From<LineCell> for Option<u64> {
    fn from(cell: LineCell) -> Self {
        match cell {
            LineCell::NotExecutable => None,
            LineCell::Hits(n) => Some(n),
        }
    }
}

/// Structural identity of one branch node: a conditional construct or one
/// of its arms.
///
/// Every run reports the same construct with the same key, so branch
/// results match by value, never by position or insertion order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchKey {
    pub kind: String,
    pub id: u64,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl BranchKey {
    pub fn new(
        kind: impl Into<String>,
        id: u64,
        start_line: u32,
        start_col: u32,
        end_line: u32,
        end_col: u32,
    ) -> Self {
        BranchKey {
            kind: kind.into(),
            id,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

// JSON object keys must be strings, so a key serializes as the JSON text
// of its six-element tuple and parses back into the structural form.
impl Serialize for BranchKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let tuple = (
            &self.kind,
            self.id,
            self.start_line,
            self.start_col,
            self.end_line,
            self.end_col,
        );
        let key = serde_json::to_string(&tuple).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&key)
    }
}

impl<'de> Deserialize<'de> for BranchKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let key = String::deserialize(deserializer)?;
        let (kind, id, start_line, start_col, end_line, end_col): (String, u64, u32, u32, u32, u32) =
            serde_json::from_str(&key).map_err(serde::de::Error::custom)?;
        Ok(BranchKey {
            kind,
            id,
            start_line,
            start_col,
            end_line,
            end_col,
        })
    }
}

/// Hit counts for the arms of one conditional, keyed by arm.
pub type BranchArms = BTreeMap<BranchKey, u64>;

/// All branch coverage for one file: conditional, then arm, then count.
pub type BranchTable = BTreeMap<BranchKey, BranchArms>;

/// Coverage data for a single source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileCoverage {
    pub lines: Vec<LineCell>,
    /// Empty when the run collected no branch data for this file.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub branches: BranchTable,
}

/// One run's complete coverage data, keyed by absolute file path.
pub type Snapshot = BTreeMap<String, FileCoverage>;

/// One file of a result, as exposed to filtering, grouping and formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub filename: String,
    pub coverage: FileCoverage,
}

impl SourceFile {
    /// Number of executable lines.
    #[must_use]
    pub fn lines_of_code(&self) -> u64 {
        self.coverage
            .lines
            .iter()
            .filter(|c| c.is_executable())
            .count() as u64
    }

    /// Number of executable lines hit at least once.
    #[must_use]
    pub fn covered_lines(&self) -> u64 {
        self.coverage
            .lines
            .iter()
            .filter(|c| c.is_covered())
            .count() as u64
    }

    /// Number of executable lines never hit.
    #[must_use]
    pub fn missed_lines(&self) -> u64 {
        self.lines_of_code() - self.covered_lines()
    }

    #[must_use]
    pub fn line_rate(&self) -> f64 {
        rate(self.covered_lines(), self.lines_of_code())
    }

    /// Total number of branch arms.
    #[must_use]
    pub fn total_branches(&self) -> u64 {
        self.coverage
            .branches
            .values()
            .map(|arms| arms.len() as u64)
            .sum()
    }

    /// Number of branch arms hit at least once.
    #[must_use]
    pub fn covered_branches(&self) -> u64 {
        self.coverage
            .branches
            .values()
            .flat_map(|arms| arms.values())
            .filter(|count| **count > 0)
            .count() as u64
    }

    #[must_use]
    pub fn branch_rate(&self) -> f64 {
        rate(self.covered_branches(), self.total_branches())
    }
}

/// Aggregate stats across the files of a result.
#[derive(Debug)]
pub struct ResultSummary {
    pub total_files: u64,
    pub total_lines: u64,
    pub covered_lines: u64,
    pub total_branches: u64,
    pub covered_branches: u64,
}

impl ResultSummary {
    #[must_use]
    pub fn from_files(files: &[SourceFile]) -> Self {
        ResultSummary {
            total_files: files.len() as u64,
            total_lines: files.iter().map(SourceFile::lines_of_code).sum(),
            covered_lines: files.iter().map(SourceFile::covered_lines).sum(),
            total_branches: files.iter().map(SourceFile::total_branches).sum(),
            covered_branches: files.iter().map(SourceFile::covered_branches).sum(),
        }
    }

    #[must_use]
    pub fn line_rate(&self) -> f64 {
        rate(self.covered_lines, self.total_lines)
    }

    #[must_use]
    pub fn branch_rate(&self) -> f64 {
        rate(self.covered_branches, self.total_branches)
    }
}
