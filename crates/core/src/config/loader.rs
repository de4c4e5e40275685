//! Configuration file loader for the `.gta/` directory.
//!
//! Settings live in `.gta/config.toml`. The file is optional: a missing file
//! yields [`SimulationConfig::default`], and every field inside it is
//! optional as well.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use gta_protocol::config_models::SimulationConfig;
use std::path::Path;
use std::path::PathBuf;

/// Directory holding project-local settings.
pub const CONFIG_DIR: &str = ".gta";

/// Settings file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Default location of the settings file under `root`.
pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Loads and validates the simulation settings at `path`.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file is not valid TOML or has mistyped fields
/// - A value is out of range (see [`validate`])
///
/// # Example
///
/// ```rust,no_run
/// use gta_core::config::loader::{default_config_path, load_config};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(&default_config_path(Path::new(".")))?;
/// println!("Ticking every {}ms", config.tick_interval_ms);
/// # Ok(())
/// # }
/// ```
pub fn load_config(path: &Path) -> ConfigResult<SimulationConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(SimulationConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: SimulationConfig =
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    validate(&config, path)?;

    tracing::debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

/// Checks that the simulator can run with `config`.
///
/// `path` is only used for error reporting.
pub fn validate(config: &SimulationConfig, path: &Path) -> ConfigResult<()> {
    let invalid = |field: &'static str, reason: String| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        field,
        reason,
    };

    if config.tick_interval_ms == 0 {
        return Err(invalid("tick_interval_ms", "must be greater than 0".to_string()));
    }
    if config.log_threshold == 0 {
        return Err(invalid("log_threshold", "must be greater than 0".to_string()));
    }
    // At 0.0 no stage ever reaches its threshold and a run never ends
    if !(config.log_probability > 0.0 && config.log_probability <= 1.0) {
        return Err(invalid(
            "log_probability",
            format!("expected a value within (0.0, 1.0], got {}", config.log_probability),
        ));
    }
    if config.phrases.is_empty() {
        return Err(invalid("phrases", "must not be empty".to_string()));
    }

    Ok(())
}
