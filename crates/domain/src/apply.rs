use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Copy each original into a fresh timestamped directory before writing.
    pub backup: bool,
    pub backup_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    pub message: String,
}

impl ApplyProgress {
    pub fn new(completed: usize, total: usize, message: String) -> Self {
        Self {
            completed,
            total,
            percent: progress_percent(completed, total),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub success: bool,
    pub message: String,
    pub files_written: usize,
    pub backup_dir: Option<PathBuf>,
}

pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (completed.min(total) * 100 / total) as u8
}
