use std::collections::HashMap;

use film_tagger_domain::{
    build_tasks, MetadataField, PresetCategory, PresetCollection, PresetFields, PresetLibrary, Roll,
    RollLoadReport, SelectionView, ThumbnailResult, WriteTask,
};
use log::{debug, info};

use crate::{
    AddPresetCommand, ApplicationError, ApplyEvent, ApplyPipeline, BuildTasksQuery,
    DeletePresetCommand, EditPresetCommand, FileScanner, ListPresetsQuery, LoadRollCommand,
    PollApplyCommand, PollThumbnailCommand, PresetStore, SelectImagesCommand,
    SetBatchFieldCommand, SetSelectionFieldCommand, StartApplyCommand, ThumbnailPipeline,
};

/// Owns the loaded roll and drives the background pipelines. Lives on the
/// interaction thread; workers only ever see owned snapshots.
pub struct ApplicationService {
    presets: Box<dyn PresetStore>,
    scanner: Box<dyn FileScanner>,
    thumbnails: Box<dyn ThumbnailPipeline>,
    apply: Box<dyn ApplyPipeline>,
    roll: Roll,
    batch_values: HashMap<MetadataField, Option<String>>,
    applying: bool,
}

impl ApplicationService {
    pub fn new(
        presets: Box<dyn PresetStore>,
        scanner: Box<dyn FileScanner>,
        thumbnails: Box<dyn ThumbnailPipeline>,
        apply: Box<dyn ApplyPipeline>,
    ) -> Self {
        Self {
            presets,
            scanner,
            thumbnails,
            apply,
            roll: Roll::default(),
            batch_values: HashMap::new(),
            applying: false,
        }
    }

    pub fn roll(&self) -> &Roll {
        &self.roll
    }

    pub fn is_applying(&self) -> bool {
        self.applying
    }

    pub fn load_roll(&mut self, command: LoadRollCommand) -> Result<RollLoadReport, ApplicationError> {
        self.ensure_idle()?;
        let scan = self.scanner.scan_supported(&command.folder)?;

        self.thumbnails.cancel();
        let paths: Vec<_> = scan.files.into_iter().map(|file| file.path).collect();
        self.roll = Roll::new(paths);
        for field in MetadataField::BATCH {
            if let Some(value) = self.batch_values.get(&field) {
                self.roll.set_batch_field(field, value.clone())?;
            }
        }

        let mut report = RollLoadReport {
            scanned_files: scan.scanned_files,
            supported_files: scan.supported_files,
            loaded_images: self.roll.len(),
            thumbnails_requested: 0,
        };

        if let Some(size) = command.thumbnail_size {
            if !self.roll.is_empty() {
                let paths = self.roll.images().iter().map(|image| image.path.clone()).collect();
                self.thumbnails.submit(paths, size)?;
                report.thumbnails_requested = self.roll.len();
            }
        }

        info!(
            "loaded roll {} ({} of {} files supported)",
            command.folder.display(),
            report.supported_files,
            report.scanned_files
        );
        Ok(report)
    }

    /// Next finished thumbnail of the current roll, if any.
    pub fn poll_thumbnail(
        &self,
        _command: PollThumbnailCommand,
    ) -> Result<Option<ThumbnailResult>, ApplicationError> {
        while let Some(result) = self.thumbnails.try_receive()? {
            if self.roll.contains(&result.path) {
                return Ok(Some(result));
            }
            debug!("dropping thumbnail of a previous roll: {}", result.path.display());
        }
        Ok(None)
    }

    pub fn cancel_thumbnails(&self) {
        self.thumbnails.cancel();
    }

    pub fn set_batch_field(&mut self, command: SetBatchFieldCommand) -> Result<usize, ApplicationError> {
        self.ensure_idle()?;
        let updated = self
            .roll
            .set_batch_field(command.field, command.value.clone())?;
        self.batch_values.insert(command.field, command.value);
        Ok(updated)
    }

    pub fn select_images(
        &mut self,
        command: SelectImagesCommand,
    ) -> Result<SelectionView, ApplicationError> {
        self.ensure_idle()?;
        Ok(self.roll.select(command.paths.as_slice()))
    }

    pub fn select_all(&mut self) -> Result<SelectionView, ApplicationError> {
        self.ensure_idle()?;
        Ok(self.roll.select_all())
    }

    pub fn set_selection_field(
        &mut self,
        command: SetSelectionFieldCommand,
    ) -> Result<usize, ApplicationError> {
        self.ensure_idle()?;
        Ok(self
            .roll
            .set_selection_field(command.field, command.value)?)
    }

    pub fn list_presets(&self, query: ListPresetsQuery) -> Result<PresetCollection, ApplicationError> {
        self.presets.load(query.category)
    }

    /// Current presets of every category, read fresh from the store.
    pub fn preset_library(&self) -> Result<PresetLibrary, ApplicationError> {
        Ok(PresetLibrary {
            cameras: self.presets.load(PresetCategory::Cameras)?,
            lenses: self.presets.load(PresetCategory::Lenses)?,
            film_stocks: self.presets.load(PresetCategory::FilmStocks)?,
        })
    }

    pub fn add_preset(&self, command: AddPresetCommand) -> Result<(), ApplicationError> {
        self.ensure_idle()?;
        let fields = PresetFields::from_tags(
            command.category,
            command
                .tags
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )?;
        let mut collection = self.presets.load(command.category)?;
        collection.add(&command.name, fields)?;
        self.presets.save(&collection)?;
        info!("added {} preset {:?}", command.category, command.name.trim());
        Ok(())
    }

    pub fn edit_preset(&self, command: EditPresetCommand) -> Result<(), ApplicationError> {
        self.ensure_idle()?;
        let mut collection = self.presets.load(command.category)?;
        let mut fields = collection.get(command.name.trim()).cloned().ok_or_else(|| {
            ApplicationError::NotFound(format!(
                "{} preset {:?}",
                command.category, command.name
            ))
        })?;
        for (name, value) in &command.tags {
            fields.set_tag(name, value)?;
        }
        collection.update(&command.name, fields)?;
        self.presets.save(&collection)?;
        info!("updated {} preset {:?}", command.category, command.name.trim());
        Ok(())
    }

    pub fn delete_preset(&self, command: DeletePresetCommand) -> Result<(), ApplicationError> {
        self.ensure_idle()?;
        let mut collection = self.presets.load(command.category)?;
        collection.remove(&command.name)?;
        self.presets.save(&collection)?;
        info!("deleted {} preset {:?}", command.category, command.name.trim());
        Ok(())
    }

    pub fn build_tasks(&self, _query: BuildTasksQuery) -> Result<Vec<WriteTask>, ApplicationError> {
        let library = self.preset_library()?;
        Ok(build_tasks(self.roll.images(), &library))
    }

    /// Hands a snapshot of the resolved tasks to the apply pipeline. Until the
    /// run reports completion, edits and loads are rejected.
    pub fn start_apply(&mut self, command: StartApplyCommand) -> Result<usize, ApplicationError> {
        self.ensure_idle()?;
        if self.roll.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "no images loaded to apply metadata to".to_string(),
            ));
        }
        let tasks = self.build_tasks(BuildTasksQuery)?;
        let count = tasks.len();
        self.apply.start(tasks, command.options)?;
        self.applying = true;
        info!("started applying metadata to {count} image(s)");
        Ok(count)
    }

    pub fn poll_apply(&mut self, _command: PollApplyCommand) -> Result<Option<ApplyEvent>, ApplicationError> {
        let event = match self.apply.try_receive() {
            Ok(event) => event,
            Err(error) => {
                // The worker is gone and will never report; unlock the roll.
                self.applying = false;
                return Err(error);
            }
        };
        if matches!(event, Some(ApplyEvent::Finished(_))) {
            self.applying = false;
        }
        Ok(event)
    }

    pub fn cancel_apply(&self) {
        if self.applying {
            self.apply.cancel();
        }
    }

    fn ensure_idle(&self) -> Result<(), ApplicationError> {
        if self.applying {
            return Err(ApplicationError::Busy(
                "metadata is being applied to the current roll".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::{BTreeMap, VecDeque};
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    use film_tagger_domain::{ApplyOptions, ApplyOutcome, DomainError, Thumbnail};

    use super::*;
    use crate::{FileScanSummary, ScannedFile};

    #[derive(Default)]
    struct FakePresetStore {
        collections: Rc<RefCell<HashMap<PresetCategory, PresetCollection>>>,
    }

    impl PresetStore for FakePresetStore {
        fn load(&self, category: PresetCategory) -> Result<PresetCollection, ApplicationError> {
            Ok(self
                .collections
                .borrow()
                .get(&category)
                .cloned()
                .unwrap_or_else(|| PresetCollection::new(category)))
        }

        fn save(&self, collection: &PresetCollection) -> Result<(), ApplicationError> {
            self.collections
                .borrow_mut()
                .insert(collection.category(), collection.clone());
            Ok(())
        }
    }

    struct FakeScanner {
        files: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl FileScanner for FakeScanner {
        fn scan_supported(&self, _folder: &Path) -> Result<FileScanSummary, ApplicationError> {
            let files: Vec<ScannedFile> = self
                .files
                .borrow()
                .iter()
                .map(|path| ScannedFile { path: path.clone() })
                .collect();
            Ok(FileScanSummary {
                scanned_files: files.len() + 1,
                supported_files: files.len(),
                files,
            })
        }
    }

    #[derive(Default)]
    struct ThumbnailState {
        submitted: Vec<(Vec<PathBuf>, u32)>,
        ready: VecDeque<ThumbnailResult>,
        cancels: usize,
    }

    struct FakeThumbnails {
        state: Rc<RefCell<ThumbnailState>>,
    }

    impl ThumbnailPipeline for FakeThumbnails {
        fn submit(&self, paths: Vec<PathBuf>, size: u32) -> Result<(), ApplicationError> {
            self.state.borrow_mut().submitted.push((paths, size));
            Ok(())
        }

        fn try_receive(&self) -> Result<Option<ThumbnailResult>, ApplicationError> {
            Ok(self.state.borrow_mut().ready.pop_front())
        }

        fn cancel(&self) {
            self.state.borrow_mut().cancels += 1;
        }
    }

    #[derive(Default)]
    struct ApplyState {
        started: Vec<(Vec<WriteTask>, ApplyOptions)>,
        events: VecDeque<ApplyEvent>,
        cancelled: bool,
        worker_lost: bool,
    }

    struct FakeApply {
        state: Rc<RefCell<ApplyState>>,
    }

    impl ApplyPipeline for FakeApply {
        fn start(&self, tasks: Vec<WriteTask>, options: ApplyOptions) -> Result<(), ApplicationError> {
            self.state.borrow_mut().started.push((tasks, options));
            Ok(())
        }

        fn try_receive(&self) -> Result<Option<ApplyEvent>, ApplicationError> {
            let mut state = self.state.borrow_mut();
            if state.worker_lost {
                return Err(ApplicationError::Io(
                    "apply worker stopped without reporting an outcome".to_string(),
                ));
            }
            Ok(state.events.pop_front())
        }

        fn cancel(&self) {
            self.state.borrow_mut().cancelled = true;
        }
    }

    struct Harness {
        service: ApplicationService,
        files: Rc<RefCell<Vec<PathBuf>>>,
        presets: Rc<RefCell<HashMap<PresetCategory, PresetCollection>>>,
        thumbnails: Rc<RefCell<ThumbnailState>>,
        apply: Rc<RefCell<ApplyState>>,
    }

    fn harness(names: &[&str]) -> Harness {
        let files = Rc::new(RefCell::new(
            names
                .iter()
                .map(|name| PathBuf::from(format!("/roll/{name}")))
                .collect::<Vec<_>>(),
        ));
        let presets = Rc::new(RefCell::new(HashMap::new()));
        let thumbnails = Rc::new(RefCell::new(ThumbnailState::default()));
        let apply = Rc::new(RefCell::new(ApplyState::default()));
        let service = ApplicationService::new(
            Box::new(FakePresetStore {
                collections: Rc::clone(&presets),
            }),
            Box::new(FakeScanner {
                files: Rc::clone(&files),
            }),
            Box::new(FakeThumbnails {
                state: Rc::clone(&thumbnails),
            }),
            Box::new(FakeApply {
                state: Rc::clone(&apply),
            }),
        );
        Harness {
            service,
            files,
            presets,
            thumbnails,
            apply,
        }
    }

    fn load(service: &mut ApplicationService, thumbnail_size: Option<u32>) -> RollLoadReport {
        service
            .load_roll(LoadRollCommand {
                folder: PathBuf::from("/roll"),
                thumbnail_size,
            })
            .expect("load should work")
    }

    fn text(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    fn apply_options() -> ApplyOptions {
        ApplyOptions {
            backup: true,
            backup_root: PathBuf::from("/scratch"),
        }
    }

    #[test]
    fn load_roll_builds_records_and_requests_thumbnails() {
        let mut h = harness(&["1.jpg", "2.tif"]);
        let report = load(&mut h.service, Some(200));

        assert_eq!(report.scanned_files, 3);
        assert_eq!(report.supported_files, 2);
        assert_eq!(report.loaded_images, 2);
        assert_eq!(report.thumbnails_requested, 2);
        let thumbnails = h.thumbnails.borrow();
        assert_eq!(thumbnails.submitted.len(), 1);
        assert_eq!(thumbnails.submitted[0].1, 200);
        assert_eq!(thumbnails.cancels, 1);
    }

    #[test]
    fn batch_values_carry_over_to_a_newly_loaded_roll() {
        let mut h = harness(&["1.jpg"]);
        load(&mut h.service, None);
        h.service
            .set_batch_field(SetBatchFieldCommand {
                field: MetadataField::Camera,
                value: text("Canon A1"),
            })
            .expect("batch edit");

        h.files
            .borrow_mut()
            .extend([PathBuf::from("/roll/2.jpg"), PathBuf::from("/roll/3.jpg")]);
        let report = load(&mut h.service, None);

        assert_eq!(report.loaded_images, 3);
        assert_eq!(report.thumbnails_requested, 0);
        assert!(h
            .service
            .roll()
            .images()
            .iter()
            .all(|image| image.record.camera.as_deref() == Some("Canon A1")));
    }

    #[test]
    fn stale_thumbnails_are_dropped() {
        let mut h = harness(&["1.jpg"]);
        load(&mut h.service, Some(64));
        {
            let mut thumbnails = h.thumbnails.borrow_mut();
            thumbnails.ready.push_back(ThumbnailResult {
                path: PathBuf::from("/old/9.jpg"),
                thumbnail: None,
            });
            thumbnails.ready.push_back(ThumbnailResult {
                path: PathBuf::from("/roll/1.jpg"),
                thumbnail: Some(Thumbnail {
                    width: 1,
                    height: 1,
                    rgba: vec![0, 0, 0, 255],
                }),
            });
        }

        let result = h
            .service
            .poll_thumbnail(PollThumbnailCommand)
            .expect("poll")
            .expect("one current thumbnail");
        assert_eq!(result.path, PathBuf::from("/roll/1.jpg"));
        assert!(h
            .service
            .poll_thumbnail(PollThumbnailCommand)
            .expect("poll")
            .is_none());
    }

    #[test]
    fn preset_input_errors_leave_storage_untouched() {
        let h = harness(&[]);
        let add = |name: &str| {
            h.service.add_preset(AddPresetCommand {
                category: PresetCategory::Cameras,
                name: name.to_string(),
                tags: vec![
                    ("Make".to_string(), "Canon".to_string()),
                    ("Model".to_string(), "A1".to_string()),
                ],
            })
        };

        add("Canon A1").expect("first add");
        assert!(matches!(
            add("Canon A1"),
            Err(ApplicationError::Domain(DomainError::DuplicatePresetName(_)))
        ));
        assert!(matches!(
            add("  "),
            Err(ApplicationError::Domain(DomainError::EmptyPresetName))
        ));

        let cameras = h
            .service
            .list_presets(ListPresetsQuery {
                category: PresetCategory::Cameras,
            })
            .expect("list");
        assert_eq!(cameras.names().collect::<Vec<_>>(), vec!["Canon A1"]);
        assert_eq!(h.presets.borrow().len(), 1);
    }

    #[test]
    fn edit_and_delete_presets() {
        let h = harness(&[]);
        h.service
            .add_preset(AddPresetCommand {
                category: PresetCategory::FilmStocks,
                name: "Portra".to_string(),
                tags: vec![("ISO".to_string(), "160".to_string())],
            })
            .expect("add");
        h.service
            .edit_preset(EditPresetCommand {
                category: PresetCategory::FilmStocks,
                name: "Portra".to_string(),
                tags: vec![("ISO".to_string(), "400".to_string())],
            })
            .expect("edit");

        let library = h.service.preset_library().expect("library");
        assert_eq!(
            library.film_stocks.get("Portra"),
            Some(&PresetFields::FilmStock {
                iso: "400".to_string()
            })
        );

        assert!(matches!(
            h.service.edit_preset(EditPresetCommand {
                category: PresetCategory::FilmStocks,
                name: "Ektar".to_string(),
                tags: vec![],
            }),
            Err(ApplicationError::NotFound(_))
        ));

        h.service
            .delete_preset(DeletePresetCommand {
                category: PresetCategory::FilmStocks,
                name: "Portra".to_string(),
            })
            .expect("delete");
        assert!(h
            .service
            .preset_library()
            .expect("library")
            .film_stocks
            .is_empty());
    }

    #[test]
    fn tasks_use_presets_as_currently_stored() {
        let mut h = harness(&["1.jpg", "2.jpg"]);
        load(&mut h.service, None);
        h.service
            .set_batch_field(SetBatchFieldCommand {
                field: MetadataField::Camera,
                value: text("Canon A1"),
            })
            .expect("batch");
        h.service
            .select_images(SelectImagesCommand {
                paths: vec![PathBuf::from("/roll/1.jpg")],
            })
            .expect("select");
        h.service
            .set_selection_field(SetSelectionFieldCommand {
                field: MetadataField::Aperture,
                value: text("8"),
            })
            .expect("selection");

        let before = h.service.build_tasks(BuildTasksQuery).expect("tasks");
        assert!(before[0].tags.get("Make").is_none());

        h.service
            .add_preset(AddPresetCommand {
                category: PresetCategory::Cameras,
                name: "Canon A1".to_string(),
                tags: vec![
                    ("Make".to_string(), "Canon".to_string()),
                    ("Model".to_string(), "A1".to_string()),
                ],
            })
            .expect("add");

        let tasks = h.service.build_tasks(BuildTasksQuery).expect("tasks");
        assert_eq!(
            tasks[0].tags,
            BTreeMap::from([
                ("FNumber".to_string(), "8".to_string()),
                ("Make".to_string(), "Canon".to_string()),
                ("Model".to_string(), "A1".to_string()),
            ])
        );
        assert_eq!(
            tasks[1].tags,
            BTreeMap::from([
                ("Make".to_string(), "Canon".to_string()),
                ("Model".to_string(), "A1".to_string()),
            ])
        );
    }

    #[test]
    fn inputs_are_inert_while_applying() {
        let mut h = harness(&["1.jpg"]);
        load(&mut h.service, None);

        let count = h
            .service
            .start_apply(StartApplyCommand {
                options: apply_options(),
            })
            .expect("start");
        assert_eq!(count, 1);
        assert!(h.service.is_applying());
        assert_eq!(h.apply.borrow().started.len(), 1);

        assert!(matches!(
            h.service.set_batch_field(SetBatchFieldCommand {
                field: MetadataField::RollNotes,
                value: text("late edit"),
            }),
            Err(ApplicationError::Busy(_))
        ));
        assert!(matches!(
            h.service.load_roll(LoadRollCommand {
                folder: PathBuf::from("/roll"),
                thumbnail_size: None,
            }),
            Err(ApplicationError::Busy(_))
        ));
        assert!(matches!(
            h.service.start_apply(StartApplyCommand {
                options: apply_options(),
            }),
            Err(ApplicationError::Busy(_))
        ));

        h.service.cancel_apply();
        assert!(h.apply.borrow().cancelled);

        h.apply
            .borrow_mut()
            .events
            .push_back(ApplyEvent::Finished(ApplyOutcome {
                success: false,
                message: "apply cancelled by user".to_string(),
                files_written: 0,
                backup_dir: None,
            }));
        let event = h.service.poll_apply(PollApplyCommand).expect("poll");
        assert!(matches!(event, Some(ApplyEvent::Finished(_))));
        assert!(!h.service.is_applying());
        h.service
            .set_batch_field(SetBatchFieldCommand {
                field: MetadataField::RollNotes,
                value: text("late edit"),
            })
            .expect("edits accepted again");
    }

    #[test]
    fn apply_requires_a_loaded_roll() {
        let mut h = harness(&[]);
        load(&mut h.service, None);
        assert!(matches!(
            h.service.start_apply(StartApplyCommand {
                options: apply_options(),
            }),
            Err(ApplicationError::InvalidInput(_))
        ));
        assert!(!h.service.is_applying());
    }

    #[test]
    fn lost_apply_worker_unlocks_the_roll() {
        let mut h = harness(&["1.jpg"]);
        load(&mut h.service, None);
        h.service
            .start_apply(StartApplyCommand {
                options: apply_options(),
            })
            .expect("start");
        h.apply.borrow_mut().worker_lost = true;

        assert!(matches!(
            h.service.poll_apply(PollApplyCommand),
            Err(ApplicationError::Io(_))
        ));
        assert!(!h.service.is_applying());
        h.service
            .set_batch_field(SetBatchFieldCommand {
                field: MetadataField::Camera,
                value: text("Canon A1"),
            })
            .expect("edits accepted after the worker is gone");

        h.apply.borrow_mut().worker_lost = false;
        h.service
            .start_apply(StartApplyCommand {
                options: apply_options(),
            })
            .expect("a new apply can start");
    }
}
