use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// A roll sheet: batch values for the whole roll plus per-frame edits, kept
/// next to the scans so a roll can be re-tagged in one go.
///
/// ```toml
/// camera = "Canon A1"
/// film_stock = "Portra 400"
///
/// [[frames]]
/// files = ["01.jpg", "02.jpg"]
/// lens = "FD 50mm"
/// aperture = "8"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RollSheet {
    pub camera: Option<String>,
    pub film_stock: Option<String>,
    pub notes: Option<String>,
    pub frames: Vec<FrameEdit>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameEdit {
    /// File names inside the roll folder.
    pub files: Vec<PathBuf>,
    pub lens: Option<String>,
    pub aperture: Option<String>,
    pub shutter_speed: Option<String>,
}

impl RollSheet {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|error| format!("could not read roll sheet {}: {error}", path.display()))?;
        toml::from_str(&text)
            .map_err(|error| format!("invalid roll sheet {}: {error}", path.display()))
    }
}
