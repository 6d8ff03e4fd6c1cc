use std::path::Path;

use film_tagger_application::{ApplicationError, ThumbnailGenerator};
use film_tagger_domain::{detect_image_kind, ImageKind, Thumbnail};
use image::io::Reader as ImageReader;

/// Decodes the source image and scales it to fit a `size` x `size` box.
#[derive(Debug, Default)]
pub struct FsThumbnailGenerator;

impl ThumbnailGenerator for FsThumbnailGenerator {
    fn generate(&self, source_path: &Path, size: u32) -> Result<Thumbnail, ApplicationError> {
        if size == 0 {
            return Err(ApplicationError::InvalidInput(
                "thumbnail size must be positive".to_string(),
            ));
        }
        match detect_image_kind(source_path) {
            ImageKind::Jpeg | ImageKind::Tiff | ImageKind::Png => {}
            ImageKind::Heic | ImageKind::Unsupported => {
                return Err(ApplicationError::Decode(format!(
                    "no decoder for {}",
                    source_path.display()
                )))
            }
        }

        let image = ImageReader::open(source_path)
            .map_err(|error| ApplicationError::Io(error.to_string()))?
            .with_guessed_format()
            .map_err(|error| ApplicationError::Decode(error.to_string()))?
            .decode()
            .map_err(|error| ApplicationError::Decode(error.to_string()))?;

        let thumb = image.thumbnail(size, size).to_rgba8();
        Ok(Thumbnail {
            width: thumb.width(),
            height: thumb.height(),
            rgba: thumb.into_raw(),
        })
    }
}
