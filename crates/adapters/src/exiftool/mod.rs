use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use film_tagger_application::{ApplicationError, MetadataWriter};
use log::debug;

/// Writes tags in place by running ExifTool once per file.
#[derive(Debug, Clone)]
pub struct ExifToolWriter {
    program: PathBuf,
}

impl ExifToolWriter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Version string reported by `exiftool -ver`; fails when the program is
    /// missing or exits unsuccessfully.
    pub fn version(&self) -> Result<String, ApplicationError> {
        let output = Command::new(&self.program)
            .arg("-ver")
            .output()
            .map_err(|error| {
                ApplicationError::NotFound(format!("{}: {error}", self.program.display()))
            })?;
        if !output.status.success() {
            return Err(ApplicationError::Io(format!(
                "{} -ver exited with {}",
                self.program.display(),
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for ExifToolWriter {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl MetadataWriter for ExifToolWriter {
    fn write(&self, path: &Path, tags: &BTreeMap<String, String>) -> Result<(), ApplicationError> {
        if tags.is_empty() {
            debug!("no tags to write for {}", path.display());
            return Ok(());
        }

        let output = Command::new(&self.program)
            .args(tag_arguments(tags))
            .arg(path)
            .output()
            .map_err(|error| ApplicationError::MetadataWrite {
                path: path.to_path_buf(),
                reason: format!("could not run {}: {error}", self.program.display()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("exiftool exited with {}", output.status)
            } else {
                stderr
            };
            return Err(ApplicationError::MetadataWrite {
                path: path.to_path_buf(),
                reason,
            });
        }
        debug!("wrote {} tag(s) to {}", tags.len(), path.display());
        Ok(())
    }
}

fn tag_arguments(tags: &BTreeMap<String, String>) -> Vec<String> {
    std::iter::once("-overwrite_original".to_string())
        .chain(tags.iter().map(|(tag, value)| format!("-{tag}={value}")))
        .collect()
}
