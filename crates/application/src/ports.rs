use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use film_tagger_domain::{
    ApplyOptions, ApplyOutcome, ApplyProgress, PresetCategory, PresetCollection, Thumbnail,
    ThumbnailResult, WriteTask,
};

use crate::ApplicationError;

/// Durable storage of presets, one collection per category.
pub trait PresetStore {
    /// Missing storage yields an empty collection.
    fn load(&self, category: PresetCategory) -> Result<PresetCollection, ApplicationError>;

    fn save(&self, collection: &PresetCollection) -> Result<(), ApplicationError>;
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct FileScanSummary {
    pub scanned_files: usize,
    pub supported_files: usize,
    pub files: Vec<ScannedFile>,
}

pub trait FileScanner {
    fn scan_supported(&self, folder: &Path) -> Result<FileScanSummary, ApplicationError>;
}

pub trait ThumbnailGenerator: Send + Sync {
    fn generate(&self, source_path: &Path, size: u32) -> Result<Thumbnail, ApplicationError>;
}

/// Writes embedded tags into an image file in place.
pub trait MetadataWriter: Send + Sync {
    fn write(&self, path: &Path, tags: &BTreeMap<String, String>) -> Result<(), ApplicationError>;
}

pub trait BackupStore: Send + Sync {
    /// Creates a new, empty backup directory under `root`.
    fn create_backup_dir(&self, root: &Path, timestamp: &str) -> Result<PathBuf, ApplicationError>;

    /// Copies `source` into `backup_dir`, keeping its timestamps and permissions.
    fn copy_original(&self, source: &Path, backup_dir: &Path) -> Result<PathBuf, ApplicationError>;
}

pub trait Clock: Send + Sync {
    fn now_timestamp_string(&self) -> String;
}

/// Runs thumbnail jobs off the interaction thread.
pub trait ThumbnailPipeline {
    /// Queues one job per path. Jobs of an earlier submission that have not
    /// started yet are stopped.
    fn submit(&self, paths: Vec<PathBuf>, size: u32) -> Result<(), ApplicationError>;

    fn try_receive(&self) -> Result<Option<ThumbnailResult>, ApplicationError>;

    fn cancel(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyEvent {
    Progress(ApplyProgress),
    Finished(ApplyOutcome),
}

/// Runs one metadata apply at a time off the interaction thread.
pub trait ApplyPipeline {
    fn start(&self, tasks: Vec<WriteTask>, options: ApplyOptions) -> Result<(), ApplicationError>;

    fn try_receive(&self) -> Result<Option<ApplyEvent>, ApplicationError>;

    /// Asks the running apply to stop before its next file.
    fn cancel(&self);
}
