//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - resolves the fixed configuration
//! - backs up the dataset and rewrites it
//! - prints the run report

use crate::domain::FillConfig;
use crate::error::AppError;
use crate::io::FileCopyBackup;

pub mod pipeline;

/// Entry point for the `enroll-fill` binary.
pub fn run() -> Result<(), AppError> {
    let config = FillConfig::default();

    let mut rng = rand::thread_rng();
    let run = pipeline::run_fill(&config, &FileCopyBackup, &mut rng, |prepared| {
        print!(
            "{}",
            crate::report::format_run_header(&prepared.backup_path, &config.ratios)
        );
    })?;

    print!("{}", crate::report::format_summary(&run.stats, &config.csv_path));

    Ok(())
}
