mod apply;
mod thumbnails;

pub use apply::BackgroundApplyPipeline;
pub use thumbnails::BackgroundThumbnailPipeline;
