//! The fill workflow, split into the part that runs before the dataset is
//! parsed and the part that rewrites it.
//!
//! validate ratios -> check target exists -> backup -> read -> transform -> write
//!
//! Any fatal error stops the run before the target is written. Errors raised
//! by `rewrite` leave the backup from `prepare` in place.

use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::info;

use crate::domain::{EnrollmentStats, FillConfig};
use crate::error::AppError;
use crate::io::{Backup, read_dataset, write_dataset};
use crate::transform::{RangeCheck, transform_rows, validate_ratios};

/// State after the pre-parse checks and the backup succeeded.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub range_check: RangeCheck,
    pub backup_path: PathBuf,
}

/// All outputs of a complete run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub prepared: Prepared,
    pub stats: EnrollmentStats,
}

/// Validate configuration, confirm the target exists, and back it up.
pub fn prepare(config: &FillConfig, backup: &dyn Backup) -> Result<Prepared, AppError> {
    let range_check = validate_ratios(&config.ratios)?;

    ensure_exists(&config.csv_path)?;

    let backup_path = config.backup_path();
    backup.backup(&config.csv_path, &backup_path)?;
    info!(backup = %backup_path.display(), "backup written");

    Ok(Prepared {
        range_check,
        backup_path,
    })
}

/// Read the dataset, rewrite `enrolled_count` on every row, and write it back.
pub fn rewrite<R: Rng + ?Sized>(config: &FillConfig, rng: &mut R) -> Result<EnrollmentStats, AppError> {
    let mut dataset = read_dataset(&config.csv_path)?;
    info!(rows = dataset.rows.len(), columns = dataset.header.len(), "dataset loaded");

    let stats = transform_rows(&dataset.header, &mut dataset.rows, &config.ratios, rng)?;

    write_dataset(&config.csv_path, &dataset)?;
    info!(
        updated = stats.updated_rows,
        total = stats.total_rows,
        path = %config.csv_path.display(),
        "dataset rewritten"
    );

    Ok(stats)
}

/// Run `prepare` and `rewrite` back to back.
///
/// `on_prepared` runs once the backup exists and before the dataset is parsed,
/// so it still fires when parsing later fails.
pub fn run_fill<R, F>(
    config: &FillConfig,
    backup: &dyn Backup,
    rng: &mut R,
    on_prepared: F,
) -> Result<RunOutput, AppError>
where
    R: Rng + ?Sized,
    F: FnOnce(&Prepared),
{
    let prepared = prepare(config, backup)?;
    on_prepared(&prepared);
    let stats = rewrite(config, rng)?;
    Ok(RunOutput { prepared, stats })
}

fn ensure_exists(path: &Path) -> Result<(), AppError> {
    let exists = path
        .try_exists()
        .map_err(|e| AppError::io(format!("Failed to check '{}': {e}", path.display())))?;
    if !exists {
        return Err(AppError::not_found(format!("CSV not found: {}", path.display())));
    }
    Ok(())
}
