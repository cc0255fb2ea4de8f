//! Merging of coverage results from independent test runs.
//!
//! There might be results from different kinds of runs, e.g. separate
//! frameworks or parallel shards, that need to be folded into one unified
//! snapshot. Line hit counts merge positionally, branch hit counts merge
//! by structural key, and files seen by only one run pass through
//! unchanged.
//!
//! Every function here is pure: inputs are borrowed immutably and the
//! output is freshly allocated, so callers may fold pairs concurrently in
//! any order. All inputs are assumed to describe the same version of each
//! source file; positional correspondence of line entries is not verified.

use crate::model::{BranchTable, FileCoverage, LineCell, Snapshot};

/// Merge two cells for the same line position.
///
/// A line flagged not-executable in one run must not be demoted to an
/// explicit zero-hit line by the other run's absent or zero count. Two
/// explicit zero counts stay an explicit zero.
#[must_use]
pub fn merge_cell(a: LineCell, b: LineCell) -> LineCell {
    let sum = a.hits() + b.hits();
    if sum == 0 && (!a.is_executable() || !b.is_executable()) {
        LineCell::NotExecutable
    } else {
        LineCell::Hits(sum)
    }
}

/// Merge two per-line hit sequences for one file, position by position.
///
/// Sequences of unequal length merge over the longer one, with absent
/// positions treated as not executable. Positions are assumed to refer to
/// the same physical source line in both inputs.
#[must_use]
pub fn merge_lines(a: &[LineCell], b: &[LineCell]) -> Vec<LineCell> {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            merge_cell(
                a.get(i).copied().unwrap_or(LineCell::NotExecutable),
                b.get(i).copied().unwrap_or(LineCell::NotExecutable),
            )
        })
        .collect()
}

/// Merge two per-branch tables for one file, key-wise at both nesting
/// levels.
///
/// Conditionals present on only one side pass through with their arm
/// counts untouched. Conditionals present on both sides merge their arms
/// the same way: one-sided arms pass through, shared arms add.
#[must_use]
pub fn merge_branches(a: &BranchTable, b: &BranchTable) -> BranchTable {
    // Runs without branch data contribute an empty table.
    if a.is_empty() {
        return b.clone();
    }
    if b.is_empty() {
        return a.clone();
    }

    let mut merged = a.clone();
    for (condition, arms) in b {
        match merged.get_mut(condition) {
            None => {
                merged.insert(condition.clone(), arms.clone());
            }
            Some(merged_arms) => {
                for (arm, count) in arms {
                    *merged_arms.entry(arm.clone()).or_insert(0) += count;
                }
            }
        }
    }
    merged
}

/// Merge one file's full coverage record.
///
/// A file present in only one snapshot is returned unchanged; the merge
/// machinery runs only when both sides saw the file.
#[must_use]
pub fn merge_file(a: Option<&FileCoverage>, b: Option<&FileCoverage>) -> FileCoverage {
    match (a, b) {
        (Some(a), Some(b)) => FileCoverage {
            lines: merge_lines(&a.lines, &b.lines),
            branches: merge_branches(&a.branches, &b.branches),
        },
        (Some(a), None) => a.clone(),
        (None, Some(b)) => b.clone(),
        (None, None) => FileCoverage::default(),
    }
}

/// Merge two whole snapshots over the union of their file paths.
///
/// Commutative and associative, with the empty snapshot as identity, so
/// any pairwise reduction order yields the same result.
#[must_use]
pub fn combine_pair(first: &Snapshot, second: &Snapshot) -> Snapshot {
    let mut combined = Snapshot::new();
    for path in first.keys().chain(second.keys()) {
        if combined.contains_key(path) {
            continue;
        }
        combined.insert(path.clone(), merge_file(first.get(path), second.get(path)));
    }
    combined
}

/// Fold any number of snapshots into one, seeded with the empty snapshot.
#[must_use]
pub fn combine<'a, I>(snapshots: I) -> Snapshot
where
    I: IntoIterator<Item = &'a Snapshot>,
{
    snapshots
        .into_iter()
        .fold(Snapshot::new(), |acc, next| combine_pair(&acc, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BranchArms, BranchKey};

    fn cells(values: &[Option<u64>]) -> Vec<LineCell> {
        values.iter().copied().map(LineCell::from).collect()
    }

    fn file(lines: &[Option<u64>]) -> FileCoverage {
        FileCoverage {
            lines: cells(lines),
            branches: BranchTable::new(),
        }
    }

    // -- Cell merging --------------------------------------------------------

    #[test]
    fn test_merge_cell_three_value_law() {
        use LineCell::{Hits, NotExecutable};

        assert_eq!(merge_cell(NotExecutable, NotExecutable), NotExecutable);
        assert_eq!(merge_cell(NotExecutable, Hits(0)), NotExecutable);
        assert_eq!(merge_cell(Hits(0), NotExecutable), NotExecutable);
        assert_eq!(merge_cell(Hits(0), Hits(0)), Hits(0));
        assert_eq!(merge_cell(Hits(2), Hits(3)), Hits(5));
        assert_eq!(merge_cell(Hits(1), NotExecutable), Hits(1));
        assert_eq!(merge_cell(NotExecutable, Hits(4)), Hits(4));
    }

    #[test]
    fn test_merge_lines_positional() {
        let a = cells(&[None, Some(1), Some(1), Some(1), None, None, Some(1), Some(1), None, None]);
        let b = cells(&[Some(1), None, Some(1), Some(1), None, None, Some(1), Some(1), None, None]);

        let expected = cells(&[
            Some(1),
            Some(1),
            Some(2),
            Some(2),
            None,
            None,
            Some(2),
            Some(2),
            None,
            None,
        ]);
        assert_eq!(merge_lines(&a, &b), expected);
    }

    #[test]
    fn test_merge_lines_unequal_lengths_pad_not_executable() {
        let long = cells(&[Some(1), Some(0), Some(2)]);
        let short = cells(&[Some(1)]);

        // Beyond the shorter sequence, an explicit zero meets an absent
        // position and stays out of the executable count, while a positive
        // count carries through.
        let expected = cells(&[Some(2), None, Some(2)]);
        assert_eq!(merge_lines(&long, &short), expected);
        assert_eq!(merge_lines(&short, &long), expected);
    }

    // -- Branch merging ------------------------------------------------------

    fn branch_fixture(then_hits: u64, else_hits: u64) -> BranchTable {
        let mut arms = BranchArms::new();
        arms.insert(BranchKey::new("then", 4, 8, 6, 8, 12), then_hits);
        arms.insert(BranchKey::new("else", 5, 8, 6, 8, 36), else_hits);
        let mut table = BranchTable::new();
        table.insert(BranchKey::new("if", 3, 8, 6, 8, 36), arms);
        table
    }

    #[test]
    fn test_merge_branches_adds_shared_arms() {
        let merged = merge_branches(&branch_fixture(47, 24), &branch_fixture(1, 2));

        let condition = BranchKey::new("if", 3, 8, 6, 8, 36);
        let arms = merged.get(&condition).unwrap();
        assert_eq!(arms[&BranchKey::new("then", 4, 8, 6, 8, 12)], 48);
        assert_eq!(arms[&BranchKey::new("else", 5, 8, 6, 8, 36)], 26);
    }

    #[test]
    fn test_merge_branches_one_sided_condition_passes_through() {
        let a = branch_fixture(47, 24);
        let mut b = BranchTable::new();
        let mut arms = BranchArms::new();
        arms.insert(BranchKey::new("when", 9, 12, 4, 12, 20), 3);
        b.insert(BranchKey::new("case", 8, 12, 0, 16, 3), arms);

        let merged = merge_branches(&a, &b);

        let if_key = BranchKey::new("if", 3, 8, 6, 8, 36);
        assert_eq!(merged[&if_key], a[&if_key]);
        let case_key = BranchKey::new("case", 8, 12, 0, 16, 3);
        assert_eq!(merged[&case_key], b[&case_key]);
    }

    #[test]
    fn test_merge_branches_one_sided_arm_passes_through() {
        let condition = BranchKey::new("if", 3, 8, 6, 8, 36);

        let mut a = BranchTable::new();
        let mut a_arms = BranchArms::new();
        a_arms.insert(BranchKey::new("then", 4, 8, 6, 8, 12), 7);
        a.insert(condition.clone(), a_arms);

        let mut b = BranchTable::new();
        let mut b_arms = BranchArms::new();
        b_arms.insert(BranchKey::new("else", 5, 8, 6, 8, 36), 9);
        b.insert(condition.clone(), b_arms);

        let merged = merge_branches(&a, &b);
        let arms = merged.get(&condition).unwrap();
        assert_eq!(arms[&BranchKey::new("then", 4, 8, 6, 8, 12)], 7);
        assert_eq!(arms[&BranchKey::new("else", 5, 8, 6, 8, 36)], 9);
    }

    #[test]
    fn test_merge_branches_empty_side_short_circuits() {
        let table = branch_fixture(1, 2);
        assert_eq!(merge_branches(&table, &BranchTable::new()), table);
        assert_eq!(merge_branches(&BranchTable::new(), &table), table);
        assert!(merge_branches(&BranchTable::new(), &BranchTable::new()).is_empty());
    }

    // -- File and snapshot merging -------------------------------------------

    #[test]
    fn test_merge_file_absent_side_is_identity() {
        let record = FileCoverage {
            lines: cells(&[None, Some(1)]),
            branches: branch_fixture(1, 0),
        };

        assert_eq!(merge_file(Some(&record), None), record);
        assert_eq!(merge_file(None, Some(&record)), record);
        assert_eq!(merge_file(None, None), FileCoverage::default());
    }

    #[test]
    fn test_combine_pair_key_union() {
        let mut a = Snapshot::new();
        a.insert("/src/shared.rs".to_string(), file(&[Some(1), Some(0)]));
        a.insert("/src/only_a.rs".to_string(), file(&[Some(2)]));

        let mut b = Snapshot::new();
        b.insert("/src/shared.rs".to_string(), file(&[Some(3), Some(1)]));
        b.insert("/src/only_b.rs".to_string(), file(&[None, Some(4)]));

        let combined = combine_pair(&a, &b);
        assert_eq!(combined.len(), 3);
        assert_eq!(combined["/src/shared.rs"], file(&[Some(4), Some(1)]));
        assert_eq!(combined["/src/only_a.rs"], a["/src/only_a.rs"]);
        assert_eq!(combined["/src/only_b.rs"], b["/src/only_b.rs"]);
    }

    #[test]
    fn test_combine_identity() {
        let mut x = Snapshot::new();
        x.insert("/src/lib.rs".to_string(), file(&[None, Some(1), Some(0)]));

        assert_eq!(combine([&x, &Snapshot::new()]), x);
        assert_eq!(combine([&Snapshot::new(), &x]), x);
        assert_eq!(combine([&Snapshot::new()]), Snapshot::new());
        assert_eq!(combine(std::iter::empty::<&Snapshot>()), Snapshot::new());
    }

    #[test]
    fn test_combine_order_does_not_matter() {
        let mut x = Snapshot::new();
        x.insert("/src/a.rs".to_string(), file(&[None, Some(1), Some(1)]));
        let mut y = Snapshot::new();
        y.insert("/src/a.rs".to_string(), file(&[None, Some(1), Some(4)]));
        y.insert("/src/b.rs".to_string(), file(&[Some(0)]));
        let mut z = Snapshot::new();
        z.insert("/src/a.rs".to_string(), file(&[None, Some(1), Some(2)]));

        let xyz = combine([&x, &y, &z]);
        assert_eq!(xyz, combine([&z, &y, &x]));
        assert_eq!(xyz, combine([&y, &x, &z]));

        // Pairwise regrouping agrees with the flat fold.
        let left = combine_pair(&combine_pair(&x, &y), &z);
        let right = combine_pair(&x, &combine_pair(&y, &z));
        assert_eq!(left, right);
        assert_eq!(left, xyz);

        assert_eq!(xyz["/src/a.rs"], file(&[None, Some(3), Some(7)]));
    }

    #[test]
    fn test_combine_does_not_mutate_inputs() {
        let mut a = Snapshot::new();
        a.insert("/src/lib.rs".to_string(), file(&[Some(1), Some(0)]));
        let mut b = Snapshot::new();
        b.insert("/src/lib.rs".to_string(), file(&[Some(2), Some(5)]));

        let a_before = a.clone();
        let b_before = b.clone();
        let _ = combine_pair(&a, &b);
        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
    }
}
