use std::fs;
use std::path::{Path, PathBuf};

use film_tagger_application::{ApplicationError, BackupStore};
use filetime::FileTime;
use log::warn;

/// Copies originals into `backup_<timestamp>` directories under a scratch root.
#[derive(Debug, Default)]
pub struct FsBackupStore;

impl BackupStore for FsBackupStore {
    fn create_backup_dir(&self, root: &Path, timestamp: &str) -> Result<PathBuf, ApplicationError> {
        fs::create_dir_all(root).map_err(|error| ApplicationError::Io(error.to_string()))?;

        // Two runs within the same second get distinct directories.
        let mut dir = root.join(format!("backup_{timestamp}"));
        let mut attempt = 1;
        while dir.exists() {
            attempt += 1;
            dir = root.join(format!("backup_{timestamp}_{attempt}"));
        }
        fs::create_dir(&dir).map_err(|error| ApplicationError::Io(error.to_string()))?;
        Ok(dir)
    }

    fn copy_original(&self, source: &Path, backup_dir: &Path) -> Result<PathBuf, ApplicationError> {
        let file_name = source.file_name().ok_or_else(|| {
            ApplicationError::InvalidInput(format!("not a file path: {}", source.display()))
        })?;
        let target = backup_dir.join(file_name);

        // fs::copy carries permissions over; timestamps are restored separately.
        fs::copy(source, &target).map_err(|error| ApplicationError::Io(error.to_string()))?;
        let metadata =
            fs::metadata(source).map_err(|error| ApplicationError::Io(error.to_string()))?;
        let mtime = FileTime::from_last_modification_time(&metadata);
        let atime = FileTime::from_last_access_time(&metadata);
        if let Err(error) = filetime::set_file_times(&target, atime, mtime) {
            warn!("could not keep timestamps on {}: {error}", target.display());
        }
        Ok(target)
    }
}
