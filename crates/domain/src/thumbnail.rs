use std::path::PathBuf;

/// Edge of the square box thumbnails are scaled to fit.
pub const THUMBNAIL_SIZE: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 pixels.
    pub rgba: Vec<u8>,
}

/// Reported once per thumbnail job; `thumbnail` is `None` when decoding failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailResult {
    pub path: PathBuf,
    pub thumbnail: Option<Thumbnail>,
}
