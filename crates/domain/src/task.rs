use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::{ImageRecord, PresetCollection, PresetLibrary, RollImage};

pub const APERTURE_TAG: &str = "FNumber";
pub const SHUTTER_SPEED_TAG: &str = "ShutterSpeedValue";
pub const ROLL_NOTES_TAG: &str = "ImageDescription";

/// One image and the tags to write into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTask {
    pub path: PathBuf,
    pub tags: BTreeMap<String, String>,
}

pub fn build_tasks(images: &[RollImage], presets: &PresetLibrary) -> Vec<WriteTask> {
    images
        .iter()
        .map(|image| WriteTask {
            path: image.path.clone(),
            tags: resolve_tags(&image.record, presets),
        })
        .collect()
}

/// Layers camera, film stock and lens presets, then the per-image overrides.
/// Later layers win; empty values are dropped at the end. A preset name with
/// no matching preset contributes nothing.
pub fn resolve_tags(record: &ImageRecord, presets: &PresetLibrary) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    expand_preset(&mut tags, &presets.cameras, record.camera.as_deref());
    expand_preset(&mut tags, &presets.film_stocks, record.film_stock.as_deref());
    expand_preset(&mut tags, &presets.lenses, record.lens.as_deref());

    let overrides = [
        (APERTURE_TAG, &record.aperture),
        (SHUTTER_SPEED_TAG, &record.shutter_speed),
        (ROLL_NOTES_TAG, &record.roll_notes),
    ];
    for (tag, value) in overrides {
        tags.insert(tag.to_string(), value.clone().unwrap_or_default());
    }

    tags.retain(|_, value| !value.is_empty());
    tags
}

fn expand_preset(
    tags: &mut BTreeMap<String, String>,
    collection: &PresetCollection,
    name: Option<&str>,
) {
    let Some(fields) = name.and_then(|name| collection.get(name)) else {
        return;
    };
    for (tag, value) in fields.tags() {
        tags.insert(tag.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PresetCategory, PresetFields};

    fn library() -> PresetLibrary {
        let mut library = PresetLibrary::default();
        library
            .cameras
            .add(
                "Canon A1",
                PresetFields::Camera {
                    make: "Canon".to_string(),
                    model: "A1".to_string(),
                },
            )
            .expect("camera");
        library
            .lenses
            .add(
                "FD 50mm",
                PresetFields::Lens {
                    lens_model: "FD 50mm f/1.8".to_string(),
                },
            )
            .expect("lens");
        library
            .film_stocks
            .add(
                "Portra 400",
                PresetFields::FilmStock {
                    iso: "400".to_string(),
                },
            )
            .expect("film");
        library
    }

    fn tag_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn camera_preset_and_aperture_resolve_with_empty_fields_dropped() {
        let record = ImageRecord {
            camera: Some("Canon A1".to_string()),
            aperture: Some("8".to_string()),
            ..ImageRecord::default()
        };
        assert_eq!(
            resolve_tags(&record, &library()),
            tag_map(&[("Make", "Canon"), ("Model", "A1"), ("FNumber", "8")])
        );
    }

    #[test]
    fn all_layers_and_overrides_combine() {
        let record = ImageRecord {
            camera: Some("Canon A1".to_string()),
            film_stock: Some("Portra 400".to_string()),
            roll_notes: Some("Lisbon, May".to_string()),
            lens: Some("FD 50mm".to_string()),
            aperture: Some("2.8".to_string()),
            shutter_speed: Some("1/250".to_string()),
        };
        assert_eq!(
            resolve_tags(&record, &library()),
            tag_map(&[
                ("Make", "Canon"),
                ("Model", "A1"),
                ("ISO", "400"),
                ("LensModel", "FD 50mm f/1.8"),
                ("FNumber", "2.8"),
                ("ShutterSpeedValue", "1/250"),
                ("ImageDescription", "Lisbon, May"),
            ])
        );
    }

    #[test]
    fn unknown_preset_names_contribute_nothing() {
        let record = ImageRecord {
            camera: Some("--- Select Camera ---".to_string()),
            lens: Some("Unknown lens".to_string()),
            shutter_speed: Some("1/60".to_string()),
            ..ImageRecord::default()
        };
        assert_eq!(
            resolve_tags(&record, &library()),
            tag_map(&[("ShutterSpeedValue", "1/60")])
        );
    }

    #[test]
    fn empty_preset_values_are_dropped() {
        let mut library = library();
        library
            .cameras
            .add(
                "Mystery body",
                PresetFields::from_tags(PresetCategory::Cameras, [("Make", "Zenit")])
                    .expect("fields"),
            )
            .expect("camera");
        let record = ImageRecord {
            camera: Some("Mystery body".to_string()),
            aperture: Some(String::new()),
            ..ImageRecord::default()
        };
        assert_eq!(resolve_tags(&record, &library), tag_map(&[("Make", "Zenit")]));
    }

    #[test]
    fn building_twice_gives_identical_tasks_in_roll_order() {
        let mut roll = crate::Roll::new(["/roll/2.jpg", "/roll/1.jpg"].map(PathBuf::from));
        roll.set_batch_field(crate::MetadataField::Camera, Some("Canon A1".to_string()))
            .expect("batch");
        let presets = library();

        let first = build_tasks(roll.images(), &presets);
        let second = build_tasks(roll.images(), &presets);

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].path, PathBuf::from("/roll/2.jpg"));
        assert_eq!(first[1].path, PathBuf::from("/roll/1.jpg"));
        assert_eq!(first[0].tags, tag_map(&[("Make", "Canon"), ("Model", "A1")]));
    }
}
