use std::path::PathBuf;

use film_tagger_domain::{ApplyOptions, MetadataField, PresetCategory};

#[derive(Debug, Clone)]
pub struct LoadRollCommand {
    pub folder: PathBuf,
    /// Thumbnail edge in pixels; `None` skips thumbnail generation.
    pub thumbnail_size: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SetBatchFieldCommand {
    pub field: MetadataField,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SelectImagesCommand {
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SetSelectionFieldCommand {
    pub field: MetadataField,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ListPresetsQuery {
    pub category: PresetCategory,
}

#[derive(Debug, Clone)]
pub struct AddPresetCommand {
    pub category: PresetCategory,
    pub name: String,
    pub tags: Vec<(String, String)>,
}

/// Overwrites the given tags of an existing preset; other tags keep their value.
#[derive(Debug, Clone)]
pub struct EditPresetCommand {
    pub category: PresetCategory,
    pub name: String,
    pub tags: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct DeletePresetCommand {
    pub category: PresetCategory,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct BuildTasksQuery;

#[derive(Debug, Clone)]
pub struct StartApplyCommand {
    pub options: ApplyOptions,
}

#[derive(Debug, Clone, Default)]
pub struct PollApplyCommand;

#[derive(Debug, Clone, Default)]
pub struct PollThumbnailCommand;
