//! Output formatting for combined coverage results.

use std::fmt::Write;

use crate::model::ResultSummary;
use crate::result::CoverageResult;

/// Renders a coverage result to human-readable output.
pub trait Formatter {
    fn format(&self, result: &CoverageResult) -> String;
}

/// Plain text formatter: a per-file table followed by summary totals.
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format(&self, result: &CoverageResult) -> String {
        let mut out = String::new();

        writeln!(out, "Command:    {}", result.command_name).unwrap();
        writeln!(out, "Created:    {}", result.created_at.to_rfc3339()).unwrap();

        let files = result.files();
        if files.is_empty() {
            out.push_str("No coverage data.\n");
            return out;
        }

        out.push('\n');
        writeln!(
            out,
            "{:<60} {:>8} {:>8} {:>8}",
            "FILE", "LINES", "COVERED", "RATE"
        )
        .unwrap();
        writeln!(out, "{}", "-".repeat(88)).unwrap();
        for f in files {
            writeln!(
                out,
                "{:<60} {:>8} {:>8} {:>7.1}%",
                f.filename,
                f.lines_of_code(),
                f.covered_lines(),
                f.line_rate() * 100.0
            )
            .unwrap();
        }

        let summary = ResultSummary::from_files(files);
        out.push('\n');
        writeln!(out, "Files:      {}", summary.total_files).unwrap();
        writeln!(
            out,
            "Lines:      {}/{} ({:.1}%)",
            summary.covered_lines,
            summary.total_lines,
            summary.line_rate() * 100.0
        )
        .unwrap();
        if summary.total_branches > 0 {
            writeln!(
                out,
                "Branches:   {}/{} ({:.1}%)",
                summary.covered_branches,
                summary.total_branches,
                summary.branch_rate() * 100.0
            )
            .unwrap();
        }

        out
    }
}
