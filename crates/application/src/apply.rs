use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use film_tagger_domain::{ApplyOptions, ApplyOutcome, ApplyProgress, WriteTask};
use log::{debug, info, warn};
use thiserror::Error;

use crate::{ApplicationError, BackupStore, Clock, MetadataWriter};

#[derive(Debug, Error)]
enum ApplyError {
    #[error("apply cancelled by user")]
    Cancelled,
    #[error("could not create backup directory under {}: {reason}", root.display())]
    BackupDir { root: PathBuf, reason: String },
    #[error("could not back up {}: {reason}", path.display())]
    Backup { path: PathBuf, reason: String },
    #[error("failed to write metadata to {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },
}

#[derive(Debug, Default)]
struct RunState {
    backup_dir: Option<PathBuf>,
    files_written: usize,
}

/// Executes write tasks strictly in order: backup copy, then write, per file.
/// The first failure stops the run; files already written stay written.
pub struct ApplyRunner<'a> {
    writer: &'a dyn MetadataWriter,
    backups: &'a dyn BackupStore,
    clock: &'a dyn Clock,
}

impl<'a> ApplyRunner<'a> {
    pub fn new(
        writer: &'a dyn MetadataWriter,
        backups: &'a dyn BackupStore,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            writer,
            backups,
            clock,
        }
    }

    pub fn run(
        &self,
        tasks: &[WriteTask],
        options: &ApplyOptions,
        cancel: &AtomicBool,
        on_progress: &mut dyn FnMut(ApplyProgress),
    ) -> ApplyOutcome {
        let mut state = RunState::default();
        let result = self.process(tasks, options, cancel, on_progress, &mut state);
        let RunState {
            backup_dir,
            files_written,
        } = state;

        match result {
            Ok(()) => {
                let mut message = if tasks.is_empty() {
                    "no images to apply".to_string()
                } else {
                    format!("applied metadata to {files_written} file(s)")
                };
                if let Some(dir) = &backup_dir {
                    message.push_str(&format!("; originals backed up in {}", dir.display()));
                }
                info!("{message}");
                ApplyOutcome {
                    success: true,
                    message,
                    files_written,
                    backup_dir,
                }
            }
            Err(error) => {
                let mut message = error.to_string();
                if let Some(dir) = &backup_dir {
                    message.push_str(&format!("; originals are preserved in {}", dir.display()));
                }
                warn!("apply stopped after {files_written} file(s): {message}");
                ApplyOutcome {
                    success: false,
                    message,
                    files_written,
                    backup_dir,
                }
            }
        }
    }

    fn process(
        &self,
        tasks: &[WriteTask],
        options: &ApplyOptions,
        cancel: &AtomicBool,
        on_progress: &mut dyn FnMut(ApplyProgress),
        state: &mut RunState,
    ) -> Result<(), ApplyError> {
        let total = tasks.len();
        for (index, task) in tasks.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                return Err(ApplyError::Cancelled);
            }

            if options.backup {
                let backup_dir = self.backup_dir(options, state)?;
                let copy = self
                    .backups
                    .copy_original(&task.path, &backup_dir)
                    .map_err(|error| ApplyError::Backup {
                        path: task.path.clone(),
                        reason: error.to_string(),
                    })?;
                debug!("backed up {} to {}", task.path.display(), copy.display());
            }

            self.writer
                .write(&task.path, &task.tags)
                .map_err(|error| ApplyError::Write {
                    path: task.path.clone(),
                    reason: write_reason(error),
                })?;
            state.files_written += 1;

            let completed = index + 1;
            on_progress(ApplyProgress::new(
                completed,
                total,
                format!(
                    "applied metadata to {} ({completed}/{total})",
                    file_label(&task.path)
                ),
            ));
        }
        Ok(())
    }

    fn backup_dir(&self, options: &ApplyOptions, state: &mut RunState) -> Result<PathBuf, ApplyError> {
        if let Some(dir) = &state.backup_dir {
            return Ok(dir.clone());
        }
        let dir = self
            .backups
            .create_backup_dir(&options.backup_root, &self.clock.now_timestamp_string())
            .map_err(|error| ApplyError::BackupDir {
                root: options.backup_root.clone(),
                reason: error.to_string(),
            })?;
        info!("backing up originals to {}", dir.display());
        state.backup_dir = Some(dir.clone());
        Ok(dir)
    }
}

fn write_reason(error: ApplicationError) -> String {
    match error {
        ApplicationError::MetadataWrite { reason, .. } => reason,
        other => other.to_string(),
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
