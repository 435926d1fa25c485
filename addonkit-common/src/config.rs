//! Configuration loading and config file resolution
//!
//! Configuration lives in a single TOML file. Every field has a built-in
//! default, so a missing file or a missing key is never fatal.
//!
//! # Config file priority
//!
//! 1. Command-line argument (highest priority)
//! 2. `ADDONKIT_CONFIG` environment variable
//! 3. `<config dir>/addonkit/config.toml`
//! 4. Built-in defaults (no file)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ADDONKIT_CONFIG";

/// Default number of drawables sharing a slot that one addon can hold
pub const DEFAULT_MAX_DRAWABLES_PER_ADDON: usize = 128;

/// Default number of accepted drawables flushed to the addons at once
pub const DEFAULT_BATCH_SIZE: usize = 40;

/// Ingestion configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Managed asset storage for copied companion files
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Accepted drawables are committed every `batch_size` items
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Capacity of one addon per (category, prop, sex) slot
    #[serde(default = "default_max_drawables")]
    pub max_drawables_per_addon: usize,

    /// Delete managed asset files when their drawable is deleted
    #[serde(default)]
    pub auto_delete_files: bool,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            batch_size: default_batch_size(),
            max_drawables_per_addon: default_max_drawables(),
            auto_delete_files: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl IngestConfig {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }
        if self.max_drawables_per_addon == 0 {
            return Err(Error::Config(
                "max_drawables_per_addon must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_max_drawables() -> usize {
    DEFAULT_MAX_DRAWABLES_PER_ADDON
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolve which config file to read, if any
///
/// Returns `None` when neither the CLI nor the environment names a file and
/// the platform config file does not exist.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    dirs::config_dir()
        .map(|d| d.join("addonkit").join("config.toml"))
        .filter(|p| p.exists())
}

/// Parse a config file
pub fn load_toml_config(path: &Path) -> Result<IngestConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config: IngestConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// How [`load_config`] arrived at its configuration
#[derive(Debug)]
pub enum ConfigOutcome {
    /// No config file was found
    Defaults,
    Loaded(PathBuf),
    /// The file could not be read or parsed; defaults were used
    Fallback(Error),
}

impl ConfigOutcome {
    /// Report the outcome once logging is available
    pub fn log(&self) {
        match self {
            ConfigOutcome::Defaults => info!("No config file found, using built-in defaults"),
            ConfigOutcome::Loaded(path) => info!("Configuration loaded from {}", path.display()),
            ConfigOutcome::Fallback(e) => warn!("{}. Using built-in defaults.", e),
        }
    }
}

/// Load configuration without logging
///
/// Lets the caller initialize tracing from the loaded logging section first
/// and report the outcome afterwards.
pub fn load_config(cli_arg: Option<&Path>) -> (IngestConfig, ConfigOutcome) {
    let Some(path) = resolve_config_path(cli_arg) else {
        return (IngestConfig::default(), ConfigOutcome::Defaults);
    };

    match load_toml_config(&path) {
        Ok(config) => (config, ConfigOutcome::Loaded(path)),
        Err(e) => (IngestConfig::default(), ConfigOutcome::Fallback(e)),
    }
}

/// Load configuration with graceful degradation
///
/// A missing or unreadable file logs a warning and yields the defaults.
pub fn load_or_default(cli_arg: Option<&Path>) -> IngestConfig {
    let (config, outcome) = load_config(cli_arg);
    outcome.log();
    config
}

/// Write configuration to TOML atomically (temp file + rename)
pub fn write_toml_config(config: &IngestConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
