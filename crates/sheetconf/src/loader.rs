//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, SheetConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with an explicit override path.
///
/// If `override_path` is provided and exists, it replaces the local override.
pub fn discover_config_files_with_override(override_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/leadsheet/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("leadsheet/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = override_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("leadsheet.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a config file into a raw TOML table.
pub fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_table(&contents, path)
}

/// Parse TOML text into a raw table, attributing errors to `path`.
pub fn parse_table(contents: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load config from a single TOML file on top of compiled defaults.
pub fn load_from_file(path: &Path) -> Result<SheetConfig, ConfigError> {
    from_table(read_table(path)?, Some(path))
}

/// Deserialize a merged table; missing keys take compiled defaults.
pub fn from_table(table: toml::Table, path: Option<&Path>) -> Result<SheetConfig, ConfigError> {
    toml::Value::Table(table).try_into().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.map(Path::to_path_buf).unwrap_or_default(),
        message: e.to_string(),
    })
}

/// Deep-merge `overlay` into `base`. Nested tables merge key by key,
/// any other value in `overlay` replaces the one in `base`.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut SheetConfig, sources: &mut ConfigSources) {
    if let Ok(v) = env::var("LEADSHEET_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("LEADSHEET_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Ok(v) = env::var("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }

    if let Ok(v) = env::var("LEADSHEET_MAX_SECTION_BARS") {
        if let Ok(bars) = v.parse() {
            config.sections.max_bars = bars;
            sources.env_overrides.push("LEADSHEET_MAX_SECTION_BARS".to_string());
        }
    }
    if let Ok(v) = env::var("LEADSHEET_MIN_KEY_CONFIDENCE") {
        if let Ok(confidence) = v.parse() {
            config.quality.min_key_confidence = confidence;
            sources.env_overrides.push("LEADSHEET_MIN_KEY_CONFIDENCE".to_string());
        }
    }

    if let Ok(v) = env::var("LEADSHEET_MAX_CONCURRENT") {
        if let Ok(n) = v.parse() {
            config.batch.max_concurrent = n;
            sources.env_overrides.push("LEADSHEET_MAX_CONCURRENT".to_string());
        }
    }
    if let Ok(v) = env::var("LEADSHEET_SONG_TIMEOUT_MS") {
        if let Ok(ms) = v.parse() {
            config.batch.song_timeout_ms = ms;
            sources.env_overrides.push("LEADSHEET_SONG_TIMEOUT_MS".to_string());
        }
    }
}
