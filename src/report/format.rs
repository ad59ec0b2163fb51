//! Formatted terminal output.
//!
//! Everything printed to stdout is built here so the pipeline stays free of
//! presentation details. The layout is informational and may change.

use std::path::Path;

use crate::domain::{EnrollmentStats, RatioRange};

/// Lines printed once the backup exists, before the dataset is parsed.
pub fn format_run_header(backup_path: &Path, range: &RatioRange) -> String {
    let mut out = String::new();
    out.push_str(&format!("Backup written to: {}\n", backup_path.display()));
    out.push_str(&format!(
        "Ratio range: {:.1} ~ {:.1} x capacity\n",
        range.lower, range.upper
    ));
    out
}

/// Final summary: row counts, enrolled range, and over-capacity share.
pub fn format_summary(stats: &EnrollmentStats, csv_path: &Path) -> String {
    let mut out = String::new();

    out.push_str("\nDone. Summary:\n");
    out.push_str(&format!("Total rows: {}\n", stats.total_rows));
    out.push_str(&format!("Updated rows: {}\n", stats.updated_rows));
    out.push_str(&format!("Unparsable capacity: {}\n", stats.zero_capacity));

    if let (Some(min), Some(max), Some(pct)) =
        (stats.min_enrolled, stats.max_enrolled, stats.over_capacity_pct())
    {
        out.push_str(&format!("Enrolled range: {min} ~ {max}\n"));
        out.push_str(&format!(
            "Over capacity: {} ({pct:.1}%)\n",
            stats.over_capacity
        ));
    }

    out.push_str(&format!("\nRewrote: {}\n", csv_path.display()));
    out
}
