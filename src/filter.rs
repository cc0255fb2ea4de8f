//! Filters drop unwanted files from a result; groups bucket the rest
//! into named sets for reporting. Neither affects merge correctness.

use std::collections::BTreeMap;

use regex::Regex;

use crate::error::Result;
use crate::model::SourceFile;

/// Name of the bucket holding files no group claimed.
pub const UNGROUPED: &str = "Ungrouped";

/// Decides whether a source file matches. Matching files are dropped by
/// `apply` and claimed by the owning group in `grouped`.
pub trait Filter {
    fn matches(&self, file: &SourceFile) -> bool;
}

/// Matches files whose path contains the given fragment.
pub struct PathFilter {
    fragment: String,
}

impl PathFilter {
    pub fn new(fragment: impl Into<String>) -> Self {
        PathFilter {
            fragment: fragment.into(),
        }
    }
}

impl Filter for PathFilter {
    fn matches(&self, file: &SourceFile) -> bool {
        file.filename.contains(&self.fragment)
    }
}

/// Matches files whose path matches a regular expression.
pub struct RegexFilter {
    pattern: Regex,
}

impl RegexFilter {
    /// An invalid pattern is a caller error surfaced here, never during
    /// merge or reporting.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(RegexFilter {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl Filter for RegexFilter {
    fn matches(&self, file: &SourceFile) -> bool {
        self.pattern.is_match(&file.filename)
    }
}

/// Drop every file matching any of the filters.
#[must_use]
pub fn apply(filters: &[Box<dyn Filter>], files: Vec<SourceFile>) -> Vec<SourceFile> {
    files
        .into_iter()
        .filter(|file| !filters.iter().any(|f| f.matches(file)))
        .collect()
}

/// A named bucket of files for reporting.
pub struct Group {
    pub name: String,
    filter: Box<dyn Filter>,
}

impl Group {
    pub fn new(name: impl Into<String>, filter: Box<dyn Filter>) -> Self {
        Group {
            name: name.into(),
            filter,
        }
    }
}

/// Bucket files into groups. A file lands in every group whose filter
/// matches it; files claimed by no group land under `UNGROUPED` when any
/// groups are defined.
#[must_use]
pub fn grouped(groups: &[Group], files: &[SourceFile]) -> BTreeMap<String, Vec<SourceFile>> {
    let mut buckets: BTreeMap<String, Vec<SourceFile>> = BTreeMap::new();
    let mut leftover: Vec<SourceFile> = Vec::new();

    for file in files {
        let mut claimed = false;
        for group in groups {
            if group.filter.matches(file) {
                buckets.entry(group.name.clone()).or_default().push(file.clone());
                claimed = true;
            }
        }
        if !claimed {
            leftover.push(file.clone());
        }
    }

    if !groups.is_empty() && !leftover.is_empty() {
        buckets.insert(UNGROUPED.to_string(), leftover);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileCoverage, LineCell};

    fn source_file(path: &str) -> SourceFile {
        SourceFile {
            filename: path.to_string(),
            coverage: FileCoverage {
                lines: vec![LineCell::Hits(1)],
                branches: Default::default(),
            },
        }
    }

    #[test]
    fn test_path_filter() {
        let filter = PathFilter::new("/spec/");
        assert!(filter.matches(&source_file("/app/spec/foo_spec.rb")));
        assert!(!filter.matches(&source_file("/app/models/foo.rb")));
    }

    #[test]
    fn test_regex_filter() {
        let filter = RegexFilter::new(r"_test\.rs$").unwrap();
        assert!(filter.matches(&source_file("/src/lib_test.rs")));
        assert!(!filter.matches(&source_file("/src/lib.rs")));
    }

    #[test]
    fn test_regex_filter_invalid_pattern() {
        assert!(RegexFilter::new("(unclosed").is_err());
    }

    #[test]
    fn test_apply_drops_matching_files() {
        let filters: Vec<Box<dyn Filter>> = vec![
            Box::new(PathFilter::new("/vendor/")),
            Box::new(RegexFilter::new(r"_test\.rs$").unwrap()),
        ];
        let files = vec![
            source_file("/src/lib.rs"),
            source_file("/vendor/dep.rs"),
            source_file("/src/lib_test.rs"),
        ];

        let kept = apply(&filters, files);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].filename, "/src/lib.rs");
    }

    #[test]
    fn test_grouped() {
        let groups = vec![
            Group::new("Models", Box::new(PathFilter::new("/models/"))),
            Group::new("Controllers", Box::new(PathFilter::new("/controllers/"))),
        ];
        let files = vec![
            source_file("/app/models/user.rb"),
            source_file("/app/controllers/users_controller.rb"),
            source_file("/lib/util.rb"),
        ];

        let buckets = grouped(&groups, &files);
        assert_eq!(buckets["Models"].len(), 1);
        assert_eq!(buckets["Controllers"].len(), 1);
        assert_eq!(buckets[UNGROUPED].len(), 1);
        assert_eq!(buckets[UNGROUPED][0].filename, "/lib/util.rb");
    }

    #[test]
    fn test_grouped_no_groups_yields_no_buckets() {
        let buckets = grouped(&[], &[source_file("/src/lib.rs")]);
        assert!(buckets.is_empty());
    }
}
