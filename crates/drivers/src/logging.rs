use std::path::Path;

use chrono::Local;
use fern::Dispatch;
use log::{debug, LevelFilter};

pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Sends log lines to stderr at the `-v` level and, when configured, to a
/// log file at debug level or finer.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>) -> Result<(), fern::InitError> {
    let console_level = level_for(verbosity);

    let stderr_config = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(console_level)
        .chain(std::io::stderr());

    let mut root = Dispatch::new().chain(stderr_config);
    if let Some(path) = log_file {
        let file_config = Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{}][{}][{}] {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(console_level.max(LevelFilter::Debug))
            .chain(fern::log_file(path)?);
        root = root.chain(file_config);
    }
    root.apply()?;

    debug!("logging initialized at {console_level}");
    Ok(())
}
