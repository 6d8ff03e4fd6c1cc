mod config;
mod interrupt;
mod logging;
mod sheet;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use config::AppConfig;
use film_tagger_adapters::{
    present_load_report, present_outcome, present_presets, present_progress, present_roll_image,
    present_selection, present_task, present_thumbnail, BackgroundApplyPipeline,
    BackgroundThumbnailPipeline, ExifToolWriter, FsBackupStore, FsThumbnailGenerator,
    JsonPresetStore, SystemClock, WalkdirFileScanner,
};
use film_tagger_application::{
    AddPresetCommand, ApplicationError, ApplicationService, ApplyEvent, BuildTasksQuery,
    DeletePresetCommand, EditPresetCommand, ListPresetsQuery, LoadRollCommand, PollApplyCommand,
    PollThumbnailCommand, SelectImagesCommand, SetBatchFieldCommand, SetSelectionFieldCommand,
    StartApplyCommand,
};
use film_tagger_domain::{ApplyOptions, MetadataField, PresetCategory, SelectionView, Thumbnail};
use interrupt::CancelListener;
use log::{info, warn};
use sheet::RollSheet;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Parser)]
#[command(
    name = "film-tagger",
    version,
    about = "Writes camera, lens and exposure metadata into scanned film photos."
)]
struct Cli {
    /// Config file; defaults to <config dir>/film-tagger/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log more; repeat for more detail.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage camera, lens and film stock presets.
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },
    /// Load a roll and generate its thumbnails. Type q and Enter to stop.
    Scan {
        folder: PathBuf,
        /// Save each thumbnail as PNG into this directory.
        #[arg(long, value_name = "DIR")]
        thumbs_out: Option<PathBuf>,
    },
    /// Show the tags that would be written, without touching any file.
    Plan {
        folder: PathBuf,
        #[command(flatten)]
        edits: EditArgs,
    },
    /// Write the resolved tags into every image of the roll. Type q and Enter
    /// to stop after the file being written.
    Apply {
        folder: PathBuf,
        #[command(flatten)]
        edits: EditArgs,
        /// Skip copying originals before writing.
        #[arg(long)]
        no_backup: bool,
    },
}

#[derive(Debug, Subcommand)]
enum PresetAction {
    List {
        category: Option<String>,
    },
    Add {
        category: String,
        name: String,
        #[arg(value_name = "FIELD=VALUE")]
        fields: Vec<String>,
    },
    Edit {
        category: String,
        name: String,
        #[arg(value_name = "FIELD=VALUE")]
        fields: Vec<String>,
    },
    Remove {
        category: String,
        name: String,
    },
}

#[derive(Debug, Clone, Default, Args)]
struct EditArgs {
    /// Camera preset name for the whole roll.
    #[arg(long)]
    camera: Option<String>,
    /// Film stock preset name for the whole roll.
    #[arg(long)]
    film_stock: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    /// Lens preset name for the selected frames.
    #[arg(long)]
    lens: Option<String>,
    #[arg(long)]
    aperture: Option<String>,
    #[arg(long)]
    shutter_speed: Option<String>,
    /// Frames the lens and exposure values apply to; defaults to the whole roll.
    #[arg(long, num_args = 1.., value_name = "FILE")]
    select: Vec<PathBuf>,
    /// TOML roll sheet with batch values and per-frame edits.
    #[arg(long, value_name = "FILE")]
    sheet: Option<PathBuf>,
}

#[derive(Debug, Clone)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

impl CommandError {
    fn from_application(context: &str, error: ApplicationError) -> Self {
        match error {
            ApplicationError::Domain(_) | ApplicationError::InvalidInput(_) => {
                Self::Usage(format!("{context}: {error}"))
            }
            other => Self::Runtime(format!("{context}: {other}")),
        }
    }

    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Usage(_) => ExitCode::from(2),
            Self::Runtime(_) => ExitCode::from(1),
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Usage(message) | Self::Runtime(message) => message,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return if error.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::from(2);
        }
    };

    if let Err(error) = logging::init_logging(cli.verbose, config.log_file.as_deref()) {
        eprintln!("failed to initialize logging: {error}");
        return ExitCode::from(1);
    }

    match run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", error.message());
            error.exit_code()
        }
    }
}

fn build_application_service(config: &AppConfig) -> Result<ApplicationService, CommandError> {
    let thumbnails = BackgroundThumbnailPipeline::new(
        Arc::new(FsThumbnailGenerator),
        config.thumbnail_threads,
    )
    .map_err(|error| CommandError::from_application("startup failed", error))?;
    let apply = BackgroundApplyPipeline::new(
        Arc::new(ExifToolWriter::new(config.exiftool.clone())),
        Arc::new(FsBackupStore),
        Arc::new(SystemClock),
    );

    Ok(ApplicationService::new(
        Box::new(JsonPresetStore::new(config.presets_dir.clone())),
        Box::new(WalkdirFileScanner),
        Box::new(thumbnails),
        Box::new(apply),
    ))
}

fn run_command(command: Command, config: &AppConfig) -> Result<(), CommandError> {
    let mut service = build_application_service(config)?;
    match command {
        Command::Presets { action } => run_preset_action(action, &service),
        Command::Scan { folder, thumbs_out } => {
            let cancel = CancelListener::stdin();
            scan_roll(&mut service, &folder, thumbs_out.as_deref(), config, &cancel)
        }
        Command::Plan { folder, edits } => {
            load_roll(&mut service, &folder, None)?;
            apply_edits(&mut service, &folder, &edits)?;
            for image in service.roll().images() {
                println!("{}", present_roll_image(image));
            }
            let tasks = service
                .build_tasks(BuildTasksQuery)
                .map_err(|error| CommandError::from_application("plan failed", error))?;
            for task in &tasks {
                println!("{}", present_task(task));
            }
            Ok(())
        }
        Command::Apply {
            folder,
            edits,
            no_backup,
        } => {
            let version = ExifToolWriter::new(config.exiftool.clone())
                .version()
                .map_err(|error| {
                    CommandError::Runtime(format!("exiftool is required to write metadata: {error}"))
                })?;
            info!("using exiftool {version}");

            load_roll(&mut service, &folder, None)?;
            apply_edits(&mut service, &folder, &edits)?;
            let options = ApplyOptions {
                backup: config.backup && !no_backup,
                backup_root: config.backup_root.clone(),
            };
            run_apply(&mut service, options, &CancelListener::stdin())
        }
    }
}

fn run_preset_action(action: PresetAction, service: &ApplicationService) -> Result<(), CommandError> {
    match action {
        PresetAction::List { category } => {
            let categories = match category {
                Some(category) => vec![parse_category(&category)?],
                None => PresetCategory::ALL.to_vec(),
            };
            for category in categories {
                let collection = service
                    .list_presets(ListPresetsQuery { category })
                    .map_err(|error| CommandError::from_application("list failed", error))?;
                for line in present_presets(&collection) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        PresetAction::Add {
            category,
            name,
            fields,
        } => {
            let category = parse_category(&category)?;
            service
                .add_preset(AddPresetCommand {
                    category,
                    name: name.clone(),
                    tags: parse_field_pairs(&fields)?,
                })
                .map_err(|error| CommandError::from_application("add failed", error))?;
            println!("added {category} preset {name:?}");
            Ok(())
        }
        PresetAction::Edit {
            category,
            name,
            fields,
        } => {
            let category = parse_category(&category)?;
            service
                .edit_preset(EditPresetCommand {
                    category,
                    name: name.clone(),
                    tags: parse_field_pairs(&fields)?,
                })
                .map_err(|error| CommandError::from_application("edit failed", error))?;
            println!("updated {category} preset {name:?}");
            Ok(())
        }
        PresetAction::Remove { category, name } => {
            let category = parse_category(&category)?;
            service
                .delete_preset(DeletePresetCommand {
                    category,
                    name: name.clone(),
                })
                .map_err(|error| CommandError::from_application("remove failed", error))?;
            println!("removed {category} preset {name:?}");
            Ok(())
        }
    }
}

fn load_roll(
    service: &mut ApplicationService,
    folder: &Path,
    thumbnail_size: Option<u32>,
) -> Result<usize, CommandError> {
    let report = service
        .load_roll(LoadRollCommand {
            folder: folder.to_path_buf(),
            thumbnail_size,
        })
        .map_err(|error| CommandError::from_application("load failed", error))?;
    println!("{}", present_load_report(folder, &report));
    Ok(report.thumbnails_requested)
}

fn scan_roll(
    service: &mut ApplicationService,
    folder: &Path,
    thumbs_out: Option<&Path>,
    config: &AppConfig,
    cancel: &CancelListener,
) -> Result<(), CommandError> {
    if let Some(dir) = thumbs_out {
        fs::create_dir_all(dir).map_err(|error| {
            CommandError::Runtime(format!("could not create {}: {error}", dir.display()))
        })?;
    }

    let expected = load_roll(service, folder, Some(config.thumbnail_size))?;
    let mut received = 0;
    while received < expected {
        if cancel.requested() {
            service.cancel_thumbnails();
            println!("thumbnails cancelled ({received} of {expected} received)");
            return Ok(());
        }
        let Some(result) = service
            .poll_thumbnail(PollThumbnailCommand)
            .map_err(|error| CommandError::from_application("thumbnails failed", error))?
        else {
            thread::sleep(POLL_INTERVAL);
            continue;
        };
        received += 1;
        println!("{}", present_thumbnail(&result));
        if let (Some(dir), Some(thumbnail)) = (thumbs_out, &result.thumbnail) {
            save_thumbnail(dir, &result.path, thumbnail)?;
        }
    }
    Ok(())
}

fn save_thumbnail(dir: &Path, source: &Path, thumbnail: &Thumbnail) -> Result<(), CommandError> {
    let image = image::RgbaImage::from_raw(thumbnail.width, thumbnail.height, thumbnail.rgba.clone())
        .ok_or_else(|| {
            CommandError::Runtime(format!("thumbnail of {} has a bad size", source.display()))
        })?;
    let name = source
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "thumbnail".to_string());
    let target = dir.join(format!("{name}.png"));
    image
        .save_with_format(&target, image::ImageFormat::Png)
        .map_err(|error| CommandError::Runtime(format!("could not save {}: {error}", target.display())))
}

fn run_apply(
    service: &mut ApplicationService,
    options: ApplyOptions,
    cancel: &CancelListener,
) -> Result<(), CommandError> {
    service
        .start_apply(StartApplyCommand { options })
        .map_err(|error| CommandError::from_application("apply failed", error))?;

    let mut cancel_sent = false;
    loop {
        if !cancel_sent && cancel.requested() {
            println!("cancelling after the current file");
            service.cancel_apply();
            cancel_sent = true;
        }
        let event = service
            .poll_apply(PollApplyCommand)
            .map_err(|error| CommandError::from_application("apply failed", error))?;
        match event {
            Some(ApplyEvent::Progress(progress)) => println!("{}", present_progress(&progress)),
            Some(ApplyEvent::Finished(outcome)) if outcome.success => {
                println!("{}", present_outcome(&outcome));
                return Ok(());
            }
            Some(ApplyEvent::Finished(outcome)) => {
                return Err(CommandError::Runtime(present_outcome(&outcome)));
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }
}

/// Applies the roll sheet first, then command-line values on top of it.
fn apply_edits(
    service: &mut ApplicationService,
    folder: &Path,
    edits: &EditArgs,
) -> Result<(), CommandError> {
    if let Some(path) = &edits.sheet {
        let sheet = RollSheet::load(path).map_err(CommandError::Usage)?;
        apply_sheet(service, folder, &sheet)?;
    }

    set_batch_fields(
        service,
        [
            (MetadataField::Camera, &edits.camera),
            (MetadataField::FilmStock, &edits.film_stock),
            (MetadataField::RollNotes, &edits.notes),
        ],
    )?;

    let selection_values = [
        (MetadataField::Lens, &edits.lens),
        (MetadataField::Aperture, &edits.aperture),
        (MetadataField::ShutterSpeed, &edits.shutter_speed),
    ];
    if selection_values.iter().all(|(_, value)| value.is_none()) {
        if !edits.select.is_empty() {
            warn!("--select given without a lens, aperture or shutter speed; nothing to change");
        }
        return Ok(());
    }

    let view = if edits.select.is_empty() {
        service.select_all()
    } else {
        service.select_images(SelectImagesCommand {
            paths: roll_paths(folder, &edits.select),
        })
    }
    .map_err(|error| CommandError::from_application("select failed", error))?;
    if view == SelectionView::Empty {
        return Err(CommandError::Usage(
            "none of the selected files are part of the roll".to_string(),
        ));
    }
    info!("{}", present_selection(&view));
    set_selection_fields(service, selection_values)
}

fn apply_sheet(
    service: &mut ApplicationService,
    folder: &Path,
    sheet: &RollSheet,
) -> Result<(), CommandError> {
    set_batch_fields(
        service,
        [
            (MetadataField::Camera, &sheet.camera),
            (MetadataField::FilmStock, &sheet.film_stock),
            (MetadataField::RollNotes, &sheet.notes),
        ],
    )?;

    for frame in &sheet.frames {
        let view = service
            .select_images(SelectImagesCommand {
                paths: roll_paths(folder, &frame.files),
            })
            .map_err(|error| CommandError::from_application("select failed", error))?;
        if view == SelectionView::Empty {
            warn!("roll sheet frame {:?} matches no image in the roll", frame.files);
            continue;
        }
        set_selection_fields(
            service,
            [
                (MetadataField::Lens, &frame.lens),
                (MetadataField::Aperture, &frame.aperture),
                (MetadataField::ShutterSpeed, &frame.shutter_speed),
            ],
        )?;
    }
    Ok(())
}

fn set_batch_fields(
    service: &mut ApplicationService,
    values: [(MetadataField, &Option<String>); 3],
) -> Result<(), CommandError> {
    for (field, value) in values {
        if let Some(value) = value {
            service
                .set_batch_field(SetBatchFieldCommand {
                    field,
                    value: Some(value.clone()),
                })
                .map_err(|error| CommandError::from_application("edit failed", error))?;
        }
    }
    Ok(())
}

fn set_selection_fields(
    service: &mut ApplicationService,
    values: [(MetadataField, &Option<String>); 3],
) -> Result<(), CommandError> {
    for (field, value) in values {
        if let Some(value) = value {
            service
                .set_selection_field(SetSelectionFieldCommand {
                    field,
                    value: Some(value.clone()),
                })
                .map_err(|error| CommandError::from_application("edit failed", error))?;
        }
    }
    Ok(())
}

/// Roll images live directly in the folder, so only the file name counts.
fn roll_paths(folder: &Path, files: &[PathBuf]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|file| match file.file_name() {
            Some(name) => folder.join(name),
            None => file.clone(),
        })
        .collect()
}

fn parse_category(text: &str) -> Result<PresetCategory, CommandError> {
    text.parse::<PresetCategory>().map_err(|error| {
        CommandError::Usage(format!(
            "{error} (expected one of: cameras, lenses, film_stocks)"
        ))
    })
}

fn parse_field_pairs(fields: &[String]) -> Result<Vec<(String, String)>, CommandError> {
    fields
        .iter()
        .map(|field| {
            field
                .split_once('=')
                .map(|(name, value)| (name.trim().to_string(), value.to_string()))
                .ok_or_else(|| CommandError::Usage(format!("expected FIELD=VALUE, got {field:?}")))
        })
        .collect()
}
