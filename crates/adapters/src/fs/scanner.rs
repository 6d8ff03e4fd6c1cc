use std::path::Path;

use film_tagger_application::{ApplicationError, FileScanSummary, FileScanner, ScannedFile};
use film_tagger_domain::detect_image_kind;
use walkdir::WalkDir;

/// Lists the supported images directly inside a roll folder, ordered by file name.
/// Subfolders are not visited.
#[derive(Debug, Default)]
pub struct WalkdirFileScanner;

impl FileScanner for WalkdirFileScanner {
    fn scan_supported(&self, folder: &Path) -> Result<FileScanSummary, ApplicationError> {
        if !folder.is_dir() {
            return Err(ApplicationError::InvalidInput(format!(
                "folder does not exist or is not a directory: {}",
                folder.display()
            )));
        }

        let mut summary = FileScanSummary::default();

        let entries = WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok);
        for entry in entries {
            if !entry.file_type().is_file() {
                continue;
            }

            summary.scanned_files += 1;
            let file_path = entry.path();
            if !detect_image_kind(file_path).is_supported() {
                continue;
            }

            summary.supported_files += 1;
            summary.files.push(ScannedFile {
                path: file_path.to_path_buf(),
            });
        }

        Ok(summary)
    }
}
