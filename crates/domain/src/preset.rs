use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PresetCategory {
    Cameras,
    Lenses,
    FilmStocks,
}

impl PresetCategory {
    pub const ALL: [Self; 3] = [Self::Cameras, Self::Lenses, Self::FilmStocks];

    /// Storage key of the category, also used as the preset file stem.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cameras => "cameras",
            Self::Lenses => "lenses",
            Self::FilmStocks => "film_stocks",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Cameras => "Cameras",
            Self::Lenses => "Lenses",
            Self::FilmStocks => "Film Stocks",
        }
    }

    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            Self::Cameras => &["Make", "Model"],
            Self::Lenses => &["LensModel"],
            Self::FilmStocks => &["ISO"],
        }
    }
}

impl Display for PresetCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetCategory {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cameras" | "camera" => Ok(Self::Cameras),
            "lenses" | "lens" => Ok(Self::Lenses),
            "film_stocks" | "film_stock" | "films" | "film" => Ok(Self::FilmStocks),
            _ => Err(DomainError::UnknownPresetCategory(value.to_string())),
        }
    }
}

/// Tag values carried by a preset; one variant per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetFields {
    Camera { make: String, model: String },
    Lens { lens_model: String },
    FilmStock { iso: String },
}

impl PresetFields {
    pub fn empty(category: PresetCategory) -> Self {
        match category {
            PresetCategory::Cameras => Self::Camera {
                make: String::new(),
                model: String::new(),
            },
            PresetCategory::Lenses => Self::Lens {
                lens_model: String::new(),
            },
            PresetCategory::FilmStocks => Self::FilmStock { iso: String::new() },
        }
    }

    /// Builds fields from a tag mapping, rejecting tags the category does not define.
    pub fn from_tags<'a>(
        category: PresetCategory,
        tags: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, DomainError> {
        let mut fields = Self::empty(category);
        for (name, value) in tags {
            fields.set_tag(name, value)?;
        }
        Ok(fields)
    }

    pub fn category(&self) -> PresetCategory {
        match self {
            Self::Camera { .. } => PresetCategory::Cameras,
            Self::Lens { .. } => PresetCategory::Lenses,
            Self::FilmStock { .. } => PresetCategory::FilmStocks,
        }
    }

    pub fn tags(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Camera { make, model } => vec![("Make", make.as_str()), ("Model", model.as_str())],
            Self::Lens { lens_model } => vec![("LensModel", lens_model.as_str())],
            Self::FilmStock { iso } => vec![("ISO", iso.as_str())],
        }
    }

    /// Sets one tag; the value is stored trimmed.
    pub fn set_tag(&mut self, name: &str, value: &str) -> Result<(), DomainError> {
        let category = self.category();
        let slot = match self {
            Self::Camera { make, model } => match name {
                "Make" => Some(make),
                "Model" => Some(model),
                _ => None,
            },
            Self::Lens { lens_model } => (name == "LensModel").then_some(lens_model),
            Self::FilmStock { iso } => (name == "ISO").then_some(iso),
        };
        let Some(slot) = slot else {
            return Err(DomainError::UnknownPresetField {
                category: category.as_str(),
                field: name.to_string(),
            });
        };
        *slot = value.trim().to_string();
        Ok(())
    }

    pub fn to_tag_map(&self) -> BTreeMap<String, String> {
        self.tags()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

/// Named presets of one category, kept in name order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetCollection {
    category: PresetCategory,
    presets: BTreeMap<String, PresetFields>,
}

impl PresetCollection {
    pub fn new(category: PresetCategory) -> Self {
        Self {
            category,
            presets: BTreeMap::new(),
        }
    }

    pub fn category(&self) -> PresetCategory {
        self.category
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PresetFields> {
        self.presets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PresetFields)> {
        self.presets.iter().map(|(name, fields)| (name.as_str(), fields))
    }

    pub fn add(&mut self, name: &str, fields: PresetFields) -> Result<(), DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyPresetName);
        }
        self.check_category(&fields)?;
        if self.presets.contains_key(name) {
            return Err(DomainError::DuplicatePresetName(name.to_string()));
        }
        self.presets.insert(name.to_string(), fields);
        Ok(())
    }

    pub fn update(&mut self, name: &str, fields: PresetFields) -> Result<(), DomainError> {
        self.check_category(&fields)?;
        let slot = self
            .presets
            .get_mut(name.trim())
            .ok_or_else(|| DomainError::PresetNotFound(name.to_string()))?;
        *slot = fields;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<PresetFields, DomainError> {
        self.presets
            .remove(name.trim())
            .ok_or_else(|| DomainError::PresetNotFound(name.to_string()))
    }

    /// Storage form: preset name to flat tag mapping.
    pub fn to_tag_maps(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.presets
            .iter()
            .map(|(name, fields)| (name.clone(), fields.to_tag_map()))
            .collect()
    }

    /// Rebuilds a collection from its storage form. Tags the category does not
    /// define are dropped rather than rejected, so hand-edited files still load.
    pub fn from_tag_maps(
        category: PresetCategory,
        maps: BTreeMap<String, BTreeMap<String, String>>,
    ) -> Self {
        let presets = maps
            .into_iter()
            .map(|(name, tags)| {
                let mut fields = PresetFields::empty(category);
                for (tag, value) in &tags {
                    let _ = fields.set_tag(tag, value);
                }
                (name, fields)
            })
            .collect();
        Self { category, presets }
    }

    fn check_category(&self, fields: &PresetFields) -> Result<(), DomainError> {
        if fields.category() != self.category {
            return Err(DomainError::PresetCategoryMismatch {
                expected: self.category.as_str(),
                actual: fields.category().as_str(),
            });
        }
        Ok(())
    }
}

/// The three preset collections used when resolving write tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetLibrary {
    pub cameras: PresetCollection,
    pub lenses: PresetCollection,
    pub film_stocks: PresetCollection,
}

impl PresetLibrary {
    pub fn get(&self, category: PresetCategory) -> &PresetCollection {
        match category {
            PresetCategory::Cameras => &self.cameras,
            PresetCategory::Lenses => &self.lenses,
            PresetCategory::FilmStocks => &self.film_stocks,
        }
    }

    pub fn get_mut(&mut self, category: PresetCategory) -> &mut PresetCollection {
        match category {
            PresetCategory::Cameras => &mut self.cameras,
            PresetCategory::Lenses => &mut self.lenses,
            PresetCategory::FilmStocks => &mut self.film_stocks,
        }
    }
}

impl Default for PresetLibrary {
    fn default() -> Self {
        Self {
            cameras: PresetCollection::new(PresetCategory::Cameras),
            lenses: PresetCollection::new(PresetCategory::Lenses),
            film_stocks: PresetCollection::new(PresetCategory::FilmStocks),
        }
    }
}
