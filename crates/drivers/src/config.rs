use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub presets_dir: PathBuf,
    /// Scratch root that receives one `backup_<timestamp>` directory per apply.
    pub backup_root: PathBuf,
    pub exiftool: PathBuf,
    pub thumbnail_size: u32,
    /// 0 lets the pool size itself to the machine.
    pub thumbnail_threads: usize,
    pub backup: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let presets_dir = dirs::data_dir()
            .map(|dir| dir.join("film-tagger").join("presets"))
            .unwrap_or_else(|| PathBuf::from("presets"));
        Self {
            presets_dir,
            backup_root: std::env::temp_dir().join("film-tagger-backups"),
            exiftool: PathBuf::from("exiftool"),
            thumbnail_size: film_tagger_domain::THUMBNAIL_SIZE,
            thumbnail_threads: 0,
            backup: true,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Reads `explicit` when given. Otherwise the per-user config file is used
    /// if it exists, and defaults apply when it does not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("film-tagger").join("config.toml"))
}
