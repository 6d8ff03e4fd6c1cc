use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::{DomainError, FieldScope, ImageRecord, MetadataField};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollImage {
    pub path: PathBuf,
    pub record: ImageRecord,
}

/// Selection-level values shown for a single selected image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionFields {
    pub lens: Option<String>,
    pub aperture: Option<String>,
    pub shutter_speed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionView {
    Empty,
    Single {
        path: PathBuf,
        fields: SelectionFields,
    },
    /// Several images are selected; their values are not displayed.
    Mixed { count: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollLoadReport {
    pub scanned_files: usize,
    pub supported_files: usize,
    pub loaded_images: usize,
    pub thumbnails_requested: usize,
}

/// The loaded roll: images in discovery order plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct Roll {
    images: Vec<RollImage>,
    selected: Vec<usize>,
}

impl Roll {
    /// Builds a roll with an empty record per path. Repeated paths are kept once.
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut seen = HashSet::new();
        let images = paths
            .into_iter()
            .filter(|path| seen.insert(path.clone()))
            .map(|path| RollImage {
                path,
                record: ImageRecord::default(),
            })
            .collect();
        Self {
            images,
            selected: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[RollImage] {
        &self.images
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.position(path).is_some()
    }

    pub fn record(&self, path: &Path) -> Option<&ImageRecord> {
        self.position(path).map(|index| &self.images[index].record)
    }

    pub fn set_batch_field(
        &mut self,
        field: MetadataField,
        value: Option<String>,
    ) -> Result<usize, DomainError> {
        if field.scope() != FieldScope::Batch {
            return Err(DomainError::NotABatchField(field.name()));
        }
        for image in &mut self.images {
            image.record.set(field, value.clone());
        }
        Ok(self.images.len())
    }

    /// Writes `value` into every selected record; last write wins.
    pub fn set_selection_field(
        &mut self,
        field: MetadataField,
        value: Option<String>,
    ) -> Result<usize, DomainError> {
        if field.scope() != FieldScope::Selection {
            return Err(DomainError::NotASelectionField(field.name()));
        }
        for &index in &self.selected {
            self.images[index].record.set(field, value.clone());
        }
        Ok(self.selected.len())
    }

    /// Replaces the selection. Paths outside the roll are ignored.
    pub fn select<P: AsRef<Path>>(&mut self, paths: &[P]) -> SelectionView {
        let mut selected: Vec<usize> = paths
            .iter()
            .filter_map(|path| self.position(path.as_ref()))
            .collect();
        selected.sort_unstable();
        selected.dedup();
        self.selected = selected;
        self.selection_view()
    }

    pub fn select_all(&mut self) -> SelectionView {
        self.selected = (0..self.images.len()).collect();
        self.selection_view()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected_paths(&self) -> Vec<&Path> {
        self.selected
            .iter()
            .map(|&index| self.images[index].path.as_path())
            .collect()
    }

    pub fn selection_view(&self) -> SelectionView {
        match self.selected.as_slice() {
            [] => SelectionView::Empty,
            [index] => {
                let image = &self.images[*index];
                SelectionView::Single {
                    path: image.path.clone(),
                    fields: SelectionFields {
                        lens: image.record.lens.clone(),
                        aperture: image.record.aperture.clone(),
                        shutter_speed: image.record.shutter_speed.clone(),
                    },
                }
            }
            many => SelectionView::Mixed { count: many.len() },
        }
    }

    fn position(&self, path: &Path) -> Option<usize> {
        self.images.iter().position(|image| image.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roll_of(names: &[&str]) -> Roll {
        Roll::new(names.iter().map(|name| PathBuf::from(format!("/roll/{name}"))))
    }

    fn value(text: &str) -> Option<String> {
        Some(text.to_string())
    }

    #[test]
    fn new_roll_keeps_order_and_drops_duplicates() {
        let roll = roll_of(&["b.jpg", "a.jpg", "b.jpg"]);
        let paths: Vec<_> = roll.images().iter().map(|image| image.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/roll/b.jpg"), PathBuf::from("/roll/a.jpg")]
        );
        assert!(roll
            .images()
            .iter()
            .all(|image| image.record == ImageRecord::default()));
    }

    #[test]
    fn batch_edits_reach_every_image_and_last_value_wins() {
        let mut roll = roll_of(&["1.jpg", "2.jpg", "3.jpg"]);
        roll.select(&[PathBuf::from("/roll/2.jpg")]);

        roll.set_batch_field(MetadataField::Camera, value("Nikon F3"))
            .expect("batch field");
        roll.set_batch_field(MetadataField::Camera, value("Canon A1"))
            .expect("batch field");
        let updated = roll
            .set_batch_field(MetadataField::FilmStock, value("Portra 400"))
            .expect("batch field");

        assert_eq!(updated, 3);
        for image in roll.images() {
            assert_eq!(image.record.camera.as_deref(), Some("Canon A1"));
            assert_eq!(image.record.film_stock.as_deref(), Some("Portra 400"));
            assert_eq!(image.record.lens, None);
        }
    }

    #[test]
    fn single_selection_round_trips_stored_values() {
        let mut roll = roll_of(&["1.jpg", "2.jpg"]);
        let second = PathBuf::from("/roll/2.jpg");
        roll.select(&[&second]);
        roll.set_selection_field(MetadataField::Lens, value("50mm f/1.4"))
            .expect("selection field");
        roll.set_selection_field(MetadataField::Aperture, value("5.6"))
            .expect("selection field");

        roll.clear_selection();
        assert_eq!(roll.selection_view(), SelectionView::Empty);

        let view = roll.select(&[&second]);
        assert_eq!(
            view,
            SelectionView::Single {
                path: second.clone(),
                fields: SelectionFields {
                    lens: value("50mm f/1.4"),
                    aperture: value("5.6"),
                    shutter_speed: None,
                },
            }
        );
    }

    #[test]
    fn multi_selection_shows_mixed_and_overwrites_only_selected() {
        let mut roll = roll_of(&["1.jpg", "2.jpg", "3.jpg"]);
        roll.select(&[PathBuf::from("/roll/1.jpg")]);
        roll.set_selection_field(MetadataField::Aperture, value("2"))
            .expect("selection field");
        roll.select(&[PathBuf::from("/roll/2.jpg")]);
        roll.set_selection_field(MetadataField::Aperture, value("11"))
            .expect("selection field");

        let view = roll.select(&[PathBuf::from("/roll/1.jpg"), PathBuf::from("/roll/2.jpg")]);
        assert_eq!(view, SelectionView::Mixed { count: 2 });
        assert_eq!(
            roll.record(Path::new("/roll/1.jpg")).and_then(|r| r.aperture.as_deref()),
            Some("2")
        );

        let updated = roll
            .set_selection_field(MetadataField::Aperture, value("8"))
            .expect("selection field");
        assert_eq!(updated, 2);
        assert_eq!(
            roll.record(Path::new("/roll/1.jpg")).and_then(|r| r.aperture.as_deref()),
            Some("8")
        );
        assert_eq!(
            roll.record(Path::new("/roll/2.jpg")).and_then(|r| r.aperture.as_deref()),
            Some("8")
        );
        assert_eq!(
            roll.record(Path::new("/roll/3.jpg")).and_then(|r| r.aperture.as_deref()),
            None
        );
    }

    #[test]
    fn selection_edit_without_selection_changes_nothing() {
        let mut roll = roll_of(&["1.jpg"]);
        let updated = roll
            .set_selection_field(MetadataField::Lens, value("35mm"))
            .expect("selection field");
        assert_eq!(updated, 0);
        assert_eq!(roll.images()[0].record, ImageRecord::default());
    }

    #[test]
    fn select_ignores_unknown_paths_and_duplicates() {
        let mut roll = roll_of(&["1.jpg", "2.jpg"]);
        let view = roll.select(&[
            PathBuf::from("/elsewhere/1.jpg"),
            PathBuf::from("/roll/2.jpg"),
            PathBuf::from("/roll/2.jpg"),
        ]);
        assert!(matches!(view, SelectionView::Single { .. }));
        assert_eq!(roll.selected_paths(), vec![Path::new("/roll/2.jpg")]);
    }

    #[test]
    fn field_scope_is_enforced() {
        let mut roll = roll_of(&["1.jpg"]);
        assert_eq!(
            roll.set_batch_field(MetadataField::Lens, value("x")),
            Err(DomainError::NotABatchField("Lens"))
        );
        assert_eq!(
            roll.set_selection_field(MetadataField::Camera, value("x")),
            Err(DomainError::NotASelectionField("Camera"))
        );
    }

    #[test]
    fn select_all_covers_the_roll() {
        let mut roll = roll_of(&["1.jpg", "2.jpg", "3.jpg"]);
        assert_eq!(roll.select_all(), SelectionView::Mixed { count: 3 });
        roll.set_selection_field(MetadataField::ShutterSpeed, value("1/125"))
            .expect("selection field");
        assert!(roll
            .images()
            .iter()
            .all(|image| image.record.shutter_speed.as_deref() == Some("1/125")));
    }
}
