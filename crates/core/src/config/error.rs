//! Errors raised while loading `.gta/config.toml`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The settings file is not valid TOML, or a field has the wrong type.
    #[error("malformed settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A setting parsed but the simulator cannot run with it.
    #[error("invalid setting `{field}` in {path}: {reason}")]
    InvalidConfig {
        path: PathBuf,
        field: &'static str,
        reason: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
