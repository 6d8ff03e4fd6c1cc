mod backup;
mod clock;
mod scanner;
mod thumbs;

pub use backup::FsBackupStore;
pub use clock::SystemClock;
pub use scanner::WalkdirFileScanner;
pub use thumbs::FsThumbnailGenerator;
