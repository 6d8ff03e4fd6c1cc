use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("preset name must not be empty")]
    EmptyPresetName,
    #[error("a preset named {0:?} already exists")]
    DuplicatePresetName(String),
    #[error("no preset named {0:?}")]
    PresetNotFound(String),
    #[error("unknown preset category: {0}")]
    UnknownPresetCategory(String),
    #[error("{category} presets have no field {field:?}")]
    UnknownPresetField {
        category: &'static str,
        field: String,
    },
    #[error("expected {expected} preset fields, got {actual}")]
    PresetCategoryMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("{0} is not a batch field")]
    NotABatchField(&'static str),
    #[error("{0} is not a selection field")]
    NotASelectionField(&'static str),
}
