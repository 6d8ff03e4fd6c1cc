use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use film_tagger_application::{ApplicationError, PresetStore};
use film_tagger_domain::{PresetCategory, PresetCollection};
use log::{debug, warn};
use serde_json::Value;

type TagMaps = BTreeMap<String, BTreeMap<String, String>>;

/// Keeps each preset category in `<dir>/<category>.json` as
/// `{ "name": { "Tag": "value" } }`.
#[derive(Debug, Clone)]
pub struct JsonPresetStore {
    dir: PathBuf,
}

impl JsonPresetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_for(&self, category: PresetCategory) -> PathBuf {
        self.dir.join(format!("{}.json", category.as_str()))
    }
}

impl PresetStore for JsonPresetStore {
    fn load(&self, category: PresetCategory) -> Result<PresetCollection, ApplicationError> {
        let path = self.file_for(category);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("no preset file at {}", path.display());
                return Ok(PresetCollection::new(category));
            }
            Err(error) => {
                warn!("could not read presets from {}: {error}", path.display());
                return Ok(PresetCollection::new(category));
            }
        };

        match parse_tag_maps(&text) {
            Ok(maps) => Ok(PresetCollection::from_tag_maps(category, maps)),
            Err(reason) => {
                warn!("ignoring malformed preset file {}: {reason}", path.display());
                Ok(PresetCollection::new(category))
            }
        }
    }

    fn save(&self, collection: &PresetCollection) -> Result<(), ApplicationError> {
        fs::create_dir_all(&self.dir)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        let text = serde_json::to_string_pretty(&collection.to_tag_maps())
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        let path = self.file_for(collection.category());
        fs::write(&path, text).map_err(|error| {
            ApplicationError::Persistence(format!("{}: {error}", path.display()))
        })
    }
}

fn parse_tag_maps(text: &str) -> Result<TagMaps, String> {
    let value: Value = serde_json::from_str(text).map_err(|error| error.to_string())?;
    let Value::Object(presets) = value else {
        return Err("expected an object of presets".to_string());
    };

    let mut maps = TagMaps::new();
    for (name, tags) in presets {
        let Value::Object(tags) = tags else {
            return Err(format!("preset {name:?} is not an object"));
        };
        let tags = tags
            .into_iter()
            .filter_map(|(tag, value)| scalar_text(value).map(|text| (tag, text)))
            .collect();
        maps.insert(name, tags);
    }
    Ok(maps)
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
