mod apply;
mod error;
mod image;
mod preset;
mod roll;
mod task;
mod thumbnail;

pub use apply::{progress_percent, ApplyOptions, ApplyOutcome, ApplyProgress};
pub use error::DomainError;
pub use image::{
    detect_image_kind, FieldScope, ImageKind, ImageRecord, MetadataField, SUPPORTED_EXTENSIONS,
};
pub use preset::{PresetCategory, PresetCollection, PresetFields, PresetLibrary};
pub use roll::{Roll, RollImage, RollLoadReport, SelectionFields, SelectionView};
pub use task::{
    build_tasks, resolve_tags, WriteTask, APERTURE_TAG, ROLL_NOTES_TAG, SHUTTER_SPEED_TAG,
};
pub use thumbnail::{Thumbnail, ThumbnailResult, THUMBNAIL_SIZE};
