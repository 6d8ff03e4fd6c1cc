pub mod exiftool;
pub mod fs;
pub mod pipeline;
pub mod presenters;
pub mod presets;

pub use exiftool::ExifToolWriter;
pub use fs::{FsBackupStore, FsThumbnailGenerator, SystemClock, WalkdirFileScanner};
pub use pipeline::{BackgroundApplyPipeline, BackgroundThumbnailPipeline};
pub use presenters::{
    present_load_report, present_outcome, present_presets, present_progress, present_roll_image,
    present_selection, present_task, present_thumbnail,
};
pub use presets::JsonPresetStore;
