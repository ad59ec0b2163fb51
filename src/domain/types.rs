//! Shared domain types.
//!
//! These types are intentionally small and plain so they can be:
//!
//! - built once from fixed constants at startup
//! - mutated row by row during a single transform pass
//! - handed read-only to the report formatter afterwards

use std::path::{Path, PathBuf};

/// Lowest enrolled/capacity multiplier.
pub const LOWER_RATIO: f64 = 0.0;

/// Highest enrolled/capacity multiplier. Values above `1.0` allow over-capacity rows.
pub const UPPER_RATIO: f64 = 2.0;

/// Dataset rewritten in place by the binary.
pub const DEFAULT_CSV_PATH: &str = "backend/src/main/resources/sql/courses.csv";

/// Appended to the dataset path to form the backup path.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Column holding the declared maximum number of participants.
pub const CAPACITY_COLUMN: &str = "capacity";

/// Column that receives the synthesized participant count.
pub const ENROLLED_COLUMN: &str = "enrolled_count";

/// The `[lower, upper]` multiplier pair applied to a row's capacity.
///
/// The range is stored as configured. An inverted range is reported once during
/// validation and corrected per draw by the sampler; nothing here reorders it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioRange {
    pub lower: f64,
    pub upper: f64,
}

impl RatioRange {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn is_inverted(&self) -> bool {
        self.lower > self.upper
    }
}

impl Default for RatioRange {
    fn default() -> Self {
        Self::new(LOWER_RATIO, UPPER_RATIO)
    }
}

/// Run configuration, resolved once at startup from the constants above.
#[derive(Debug, Clone)]
pub struct FillConfig {
    pub csv_path: PathBuf,
    pub ratios: RatioRange,
    pub backup_suffix: String,
}

impl FillConfig {
    pub fn for_path(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            ..Self::default()
        }
    }

    /// `<csv_path><backup_suffix>`, next to the dataset.
    pub fn backup_path(&self) -> PathBuf {
        backup_path_for(&self.csv_path, &self.backup_suffix)
    }
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            ratios: RatioRange::default(),
            backup_suffix: BACKUP_SUFFIX.to_string(),
        }
    }
}

pub fn backup_path_for(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Ordered column names from the first CSV record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    columns: Vec<String>,
}

impl Header {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// One data record, positionally aligned with the `Header`.
///
/// A short record leaves trailing columns as `None`; the transformer replaces
/// those with empty strings before the row is written back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// 1-based line number in the source file (for diagnostics).
    pub line: u64,
    pub values: Vec<Option<String>>,
}

impl Row {
    pub fn new(line: u64, values: Vec<Option<String>>) -> Self {
        Self { line, values }
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).and_then(|v| v.as_deref())
    }

    pub fn set(&mut self, idx: usize, value: String) {
        if self.values.len() <= idx {
            self.values.resize(idx + 1, None);
        }
        self.values[idx] = Some(value);
    }

    /// Resize to exactly `width` columns, turning every absent value into `""`.
    pub fn fill_missing(&mut self, width: usize) {
        self.values.resize(width, None);
        for v in &mut self.values {
            if v.is_none() {
                *v = Some(String::new());
            }
        }
    }

    /// Field values in column order; absent values render as `""`.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.as_deref().unwrap_or(""))
    }
}

/// A whole CSV file held in memory.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub header: Header,
    pub rows: Vec<Row>,
    /// Whether the source started with a UTF-8 byte-order mark. Output always
    /// gets one regardless.
    pub had_bom: bool,
}

/// Counters accumulated over one transform pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentStats {
    pub total_rows: usize,
    pub updated_rows: usize,
    /// Rows whose capacity could not be parsed. A legitimate `0` is not counted.
    pub zero_capacity: usize,
    /// Smallest synthesized value among updated rows.
    pub min_enrolled: Option<i64>,
    /// Largest synthesized value among updated rows.
    pub max_enrolled: Option<i64>,
    pub over_capacity: usize,
}

impl EnrollmentStats {
    pub fn record_update(&mut self, enrolled: i64, capacity: i64) {
        self.updated_rows += 1;
        self.min_enrolled = Some(self.min_enrolled.map_or(enrolled, |m| m.min(enrolled)));
        self.max_enrolled = Some(self.max_enrolled.map_or(enrolled, |m| m.max(enrolled)));
        if enrolled > capacity {
            self.over_capacity += 1;
        }
    }

    /// Share of updated rows whose enrolled count exceeds capacity, in percent.
    pub fn over_capacity_pct(&self) -> Option<f64> {
        if self.updated_rows == 0 {
            return None;
        }
        Some(self.over_capacity as f64 / self.updated_rows as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_path_appends_suffix() {
        let cfg = FillConfig::for_path("data/courses.csv");
        assert_eq!(cfg.backup_path(), PathBuf::from("data/courses.csv.bak"));
    }

    #[test]
    fn default_ratios_match_constants() {
        let range = RatioRange::default();
        assert_eq!(range.lower, LOWER_RATIO);
        assert_eq!(range.upper, UPPER_RATIO);
        assert!(!range.is_inverted());
        assert!(RatioRange::new(1.5, 0.5).is_inverted());
    }

    #[test]
    fn fill_missing_pads_and_normalizes() {
        let mut row = Row::new(2, vec![Some("a".to_string()), None]);
        row.fill_missing(4);
        let fields: Vec<&str> = row.fields().collect();
        assert_eq!(fields, vec!["a", "", "", ""]);
        assert!(row.values.iter().all(Option::is_some));
    }

    #[test]
    fn set_extends_short_rows() {
        let mut row = Row::new(2, vec![Some("x".to_string())]);
        row.set(2, "7".to_string());
        assert_eq!(row.values.len(), 3);
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(2), Some("7"));
    }

    #[test]
    fn stats_track_min_max_and_over_capacity() {
        let mut stats = EnrollmentStats::default();
        assert_eq!(stats.over_capacity_pct(), None);

        stats.record_update(30, 40);
        stats.record_update(90, 40);
        stats.record_update(10, 40);
        stats.record_update(41, 40);

        assert_eq!(stats.updated_rows, 4);
        assert_eq!(stats.min_enrolled, Some(10));
        assert_eq!(stats.max_enrolled, Some(90));
        assert_eq!(stats.over_capacity, 2);
        let pct = stats.over_capacity_pct().unwrap();
        assert!((pct - 50.0).abs() < 1e-12);
    }

    #[test]
    fn enrolled_equal_to_capacity_is_not_over() {
        let mut stats = EnrollmentStats::default();
        stats.record_update(40, 40);
        assert_eq!(stats.over_capacity, 0);
    }
}
