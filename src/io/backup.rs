//! Pre-write backup of the target dataset.

use std::fs::{self, OpenOptions};
use std::path::Path;

use tracing::debug;

use crate::error::AppError;

/// Copies the original dataset somewhere safe before it is rewritten.
///
/// The pipeline calls this exactly once per run, after the target is known to
/// exist and before the CSV is parsed.
pub trait Backup {
    fn backup(&self, source: &Path, dest: &Path) -> Result<(), AppError>;
}

/// Full byte copy next to the source, keeping permissions and modification time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCopyBackup;

impl Backup for FileCopyBackup {
    fn backup(&self, source: &Path, dest: &Path) -> Result<(), AppError> {
        fs::copy(source, dest).map_err(|e| {
            AppError::io(format!(
                "Failed to back up '{}' to '{}': {e}",
                source.display(),
                dest.display()
            ))
        })?;

        // Timestamps are best effort; the copy itself already succeeded.
        if let Err(e) = copy_mtime(source, dest) {
            debug!(dest = %dest.display(), "could not carry over modification time: {e}");
        }
        Ok(())
    }
}

fn copy_mtime(source: &Path, dest: &Path) -> std::io::Result<()> {
    let modified = fs::metadata(source)?.modified()?;
    let file = OpenOptions::new().write(true).open(dest)?;
    file.set_modified(modified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_bytes_and_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("courses.csv");
        let dst = dir.path().join("courses.csv.bak");
        fs::write(&src, b"capacity,enrolled_count\n1,1\n").unwrap();

        FileCopyBackup.backup(&src, &dst).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), fs::read(&src).unwrap());
        let src_m = fs::metadata(&src).unwrap().modified().unwrap();
        let dst_m = fs::metadata(&dst).unwrap().modified().unwrap();
        assert_eq!(src_m, dst_m);
    }

    #[test]
    fn missing_source_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileCopyBackup
            .backup(&dir.path().join("nope.csv"), &dir.path().join("nope.csv.bak"))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
