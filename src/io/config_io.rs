use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "EISEN_DATA_DIR";

/// Config file name inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no data directory: set --data-dir, EISEN_DATA_DIR, XDG_DATA_HOME or HOME")]
    NoDataDir,
}

/// Pick the data directory: explicit flag, then `$EISEN_DATA_DIR`, then
/// `$XDG_DATA_HOME/eisen`, then `~/.local/share/eisen`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    let env = |name: &str| std::env::var_os(name).filter(|v| !v.is_empty());
    if let Some(dir) = env(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = env("XDG_DATA_HOME") {
        return Ok(PathBuf::from(xdg).join("eisen"));
    }
    env("HOME")
        .map(|home| PathBuf::from(home).join(".local/share/eisen"))
        .ok_or(ConfigError::NoDataDir)
}

/// Read `config.toml` from the data directory. A missing file means defaults.
pub fn load_config(data_dir: &Path) -> Result<Config, ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(ConfigError::ReadError { path, source: e }),
    };
    toml::from_str(&text).map_err(|e| ConfigError::ParseError { path, source: e })
}
