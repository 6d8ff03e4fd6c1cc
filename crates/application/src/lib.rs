mod apply;
mod error;
mod ports;
mod service;
mod use_cases;

pub use apply::ApplyRunner;
pub use error::ApplicationError;
pub use ports::{
    ApplyEvent, ApplyPipeline, BackupStore, Clock, FileScanSummary, FileScanner, MetadataWriter,
    PresetStore, ScannedFile, ThumbnailGenerator, ThumbnailPipeline,
};
pub use service::ApplicationService;
pub use use_cases::{
    AddPresetCommand, BuildTasksQuery, DeletePresetCommand, EditPresetCommand, ListPresetsQuery,
    LoadRollCommand, PollApplyCommand, PollThumbnailCommand, SelectImagesCommand,
    SetBatchFieldCommand, SetSelectionFieldCommand, StartApplyCommand,
};
