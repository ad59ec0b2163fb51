//! Row-by-row enrolled-count rewrite.
//!
//! Validation happens before any row is touched:
//! - ratio bounds must be non-negative (an inverted pair is only warned about)
//! - the header must exist and contain `capacity` and `enrolled_count`
//!
//! After that every row is processed independently and in order. A capacity that
//! does not parse is treated as `0` and tallied, it never aborts the run.

use rand::Rng;
use tracing::{debug, warn};

use crate::domain::{CAPACITY_COLUMN, ENROLLED_COLUMN, EnrollmentStats, Header, RatioRange, Row};
use crate::error::AppError;
use crate::sampler::pick_enrolled;

/// Result of ratio validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCheck {
    Ordered,
    /// `lower > upper`; the sampler swaps the pair on every draw.
    Inverted,
}

/// Reject negative bounds and warn (once) about an inverted pair.
pub fn validate_ratios(range: &RatioRange) -> Result<RangeCheck, AppError> {
    if range.lower.is_nan() || range.lower < 0.0 {
        return Err(AppError::configuration(format!(
            "Lower ratio must not be negative: {}",
            range.lower
        )));
    }
    if range.upper.is_nan() || range.upper < 0.0 {
        return Err(AppError::configuration(format!(
            "Upper ratio must not be negative: {}",
            range.upper
        )));
    }
    if range.is_inverted() {
        warn!(
            lower = range.lower,
            upper = range.upper,
            "lower ratio exceeds upper ratio; bounds will be swapped per row"
        );
        return Ok(RangeCheck::Inverted);
    }
    Ok(RangeCheck::Ordered)
}

/// Positions of the two columns the transform reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredColumns {
    pub capacity: usize,
    pub enrolled: usize,
}

impl RequiredColumns {
    pub fn locate(header: &Header) -> Result<Self, AppError> {
        if header.is_empty() {
            return Err(AppError::structural("Could not read a CSV header; check the file format."));
        }

        let capacity = header.position(CAPACITY_COLUMN);
        let enrolled = header.position(ENROLLED_COLUMN);

        match (capacity, enrolled) {
            (Some(capacity), Some(enrolled)) => Ok(Self { capacity, enrolled }),
            _ => {
                let missing: Vec<&str> = [(CAPACITY_COLUMN, capacity), (ENROLLED_COLUMN, enrolled)]
                    .into_iter()
                    .filter(|(_, pos)| pos.is_none())
                    .map(|(name, _)| name)
                    .collect();
                Err(AppError::structural(format!(
                    "CSV is missing required column(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// Rewrite `enrolled_count` on every row and return the counters for the pass.
///
/// Rows are updated in place. On return every row has exactly `header.len()`
/// fields, none of them absent.
pub fn transform_rows<R: Rng + ?Sized>(
    header: &Header,
    rows: &mut [Row],
    range: &RatioRange,
    rng: &mut R,
) -> Result<EnrollmentStats, AppError> {
    let cols = RequiredColumns::locate(header)?;
    let mut stats = EnrollmentStats::default();

    for row in rows.iter_mut() {
        apply_row(row, cols, range, &mut *rng, &mut stats);
        row.fill_missing(header.len());
    }

    Ok(stats)
}

fn apply_row<R: Rng + ?Sized>(
    row: &mut Row,
    cols: RequiredColumns,
    range: &RatioRange,
    rng: &mut R,
    stats: &mut EnrollmentStats,
) {
    stats.total_rows += 1;

    let raw = row.get(cols.capacity).unwrap_or("").trim();
    let capacity = match parse_capacity(raw) {
        Some(c) => c,
        None => {
            debug!(line = row.line, value = raw, "unparsable capacity, treating as 0");
            stats.zero_capacity += 1;
            0
        }
    };

    if capacity > 0 {
        let enrolled = pick_enrolled(rng, capacity, range.lower, range.upper);
        row.set(cols.enrolled, enrolled.to_string());
        stats.record_update(enrolled, capacity);
    } else {
        row.set(cols.enrolled, "0".to_string());
    }
}

/// Integer parse of an already-trimmed capacity field.
///
/// Accepts an optional sign and ASCII digits, with single `_` separators
/// allowed between digits (`1_000`). Values outside `i64` do not parse.
fn parse_capacity(raw: &str) -> Option<i64> {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    let well_formed = !digits.is_empty()
        && !digits.starts_with('_')
        && !digits.ends_with('_')
        && !digits.contains("__")
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'_');
    if !well_formed {
        return None;
    }
    raw.replace('_', "").parse::<i64>().ok()
}
