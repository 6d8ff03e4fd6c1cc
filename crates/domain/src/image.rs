use std::path::Path;

/// Extensions accepted when scanning a roll folder, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "tif", "tiff", "png", "heic"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Tiff,
    Png,
    Heic,
    Unsupported,
}

impl ImageKind {
    pub fn is_supported(self) -> bool {
        self != Self::Unsupported
    }
}

pub fn detect_image_kind(path: &Path) -> ImageKind {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return ImageKind::Unsupported;
    };

    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => ImageKind::Jpeg,
        "tif" | "tiff" => ImageKind::Tiff,
        "png" => ImageKind::Png,
        "heic" => ImageKind::Heic,
        _ => ImageKind::Unsupported,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    /// Applied to every image of the roll.
    Batch,
    /// Applied to the currently selected images only.
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    Camera,
    FilmStock,
    RollNotes,
    Lens,
    Aperture,
    ShutterSpeed,
}

impl MetadataField {
    pub const BATCH: [Self; 3] = [Self::Camera, Self::FilmStock, Self::RollNotes];
    pub const SELECTION: [Self; 3] = [Self::Lens, Self::Aperture, Self::ShutterSpeed];

    pub fn scope(self) -> FieldScope {
        match self {
            Self::Camera | Self::FilmStock | Self::RollNotes => FieldScope::Batch,
            Self::Lens | Self::Aperture | Self::ShutterSpeed => FieldScope::Selection,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Camera => "Camera",
            Self::FilmStock => "FilmStock",
            Self::RollNotes => "RollNotes",
            Self::Lens => "Lens",
            Self::Aperture => "Aperture",
            Self::ShutterSpeed => "ShutterSpeed",
        }
    }
}

/// Editable metadata of one image in the loaded roll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRecord {
    pub camera: Option<String>,
    pub film_stock: Option<String>,
    pub roll_notes: Option<String>,
    pub lens: Option<String>,
    pub aperture: Option<String>,
    pub shutter_speed: Option<String>,
}

impl ImageRecord {
    pub fn get(&self, field: MetadataField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: MetadataField, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    fn slot(&self, field: MetadataField) -> &Option<String> {
        match field {
            MetadataField::Camera => &self.camera,
            MetadataField::FilmStock => &self.film_stock,
            MetadataField::RollNotes => &self.roll_notes,
            MetadataField::Lens => &self.lens,
            MetadataField::Aperture => &self.aperture,
            MetadataField::ShutterSpeed => &self.shutter_speed,
        }
    }

    fn slot_mut(&mut self, field: MetadataField) -> &mut Option<String> {
        match field {
            MetadataField::Camera => &mut self.camera,
            MetadataField::FilmStock => &mut self.film_stock,
            MetadataField::RollNotes => &mut self.roll_notes,
            MetadataField::Lens => &mut self.lens,
            MetadataField::Aperture => &mut self.aperture,
            MetadataField::ShutterSpeed => &mut self.shutter_speed,
        }
    }
}
