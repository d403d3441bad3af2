//! Minimal configuration loading for the leadsheet converter.
//!
//! Every hand-tuned table the analysis pipeline depends on lives here as
//! plain data: track selection weights, the simultaneity window, section
//! naming, quality gate thresholds and exception lists, difficulty
//! weights and per-song time signature corrections. Compiled defaults
//! reproduce the stock behavior; any of them can be overridden from TOML.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/leadsheet/config.toml` (system)
//! 2. `~/.config/leadsheet/config.toml` (user)
//! 3. `./leadsheet.toml` (local override)
//! 4. Environment variables (`LEADSHEET_*`)
//!
//! # Example Config
//!
//! ```toml
//! [sections]
//! max_bars = 16
//!
//! [quality]
//! min_key_confidence = 0.75
//! excluded_sources = ["99_Some-Broken_File"]
//!
//! [[quality.suspicious]]
//! numerator = 12
//! denominator = 8
//! tonic = 7
//!
//! [overrides.time_signatures]
//! "33_Dave_Brubeck-Take_Five" = { numerator = 5, denominator = 4 }
//!
//! [batch]
//! max_concurrent = 8
//! song_timeout_ms = 5000
//! ```

pub mod analysis;
pub mod loader;
pub mod runtime;

pub use analysis::{
    ChordsConfig, DefaultsConfig, DifficultyConfig, OverridesConfig, QualityConfig,
    SectionsConfig, SelectionConfig, SignatureOverride, SuspiciousCombination,
};
pub use loader::{discover_config_files_with_override, ConfigSources};
pub use runtime::{BatchConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete converter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SheetConfig {
    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub chords: ChordsConfig,

    #[serde(default)]
    pub sections: SectionsConfig,

    #[serde(default)]
    pub quality: QualityConfig,

    #[serde(default)]
    pub difficulty: DifficultyConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub overrides: OverridesConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl SheetConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/leadsheet/config.toml`
    /// 3. `~/.config/leadsheet/config.toml`
    /// 4. `./leadsheet.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    ///
    /// If `config_path` is provided, it takes precedence over the local
    /// `./leadsheet.toml` override. System and user configs still load first.
    pub fn load_from(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in loader::discover_config_files_with_override(config_path) {
            let table = loader::read_table(&path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path);
        }

        let mut config = loader::from_table(merged, config_path)?;
        loader::apply_env_overrides(&mut config, &mut sources);
        config.validate()?;

        Ok((config, sources))
    }

    /// Parse a single TOML document on top of the compiled defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let path = PathBuf::from("<inline>");
        let table = loader::parse_table(contents, &path)?;
        let config = loader::from_table(table, Some(&path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sections.max_bars == 0 {
            return Err(ConfigError::Invalid("sections.max_bars must be at least 1".into()));
        }
        if self.sections.empty_song_bars == 0 {
            return Err(ConfigError::Invalid(
                "sections.empty_song_bars must be at least 1".into(),
            ));
        }
        if self.sections.max_song_bars == 0 {
            return Err(ConfigError::Invalid(
                "sections.max_song_bars must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.quality.min_key_confidence) {
            return Err(ConfigError::Invalid(format!(
                "quality.min_key_confidence must be within [0, 1], got {}",
                self.quality.min_key_confidence
            )));
        }
        if !is_positive(self.chords.simultaneity_window_ms) {
            return Err(ConfigError::Invalid(format!(
                "chords.simultaneity_window_ms must be positive and finite, got {}",
                self.chords.simultaneity_window_ms
            )));
        }
        if !is_positive(self.chords.final_chord_beats) {
            return Err(ConfigError::Invalid(format!(
                "chords.final_chord_beats must be positive and finite, got {}",
                self.chords.final_chord_beats
            )));
        }
        let selection = &self.selection;
        if !(is_positive(selection.chord_range_weight) && is_positive(selection.bass_weight)) {
            return Err(ConfigError::Invalid(
                "selection.chord_range_weight and selection.bass_weight must be positive and finite"
                    .into(),
            ));
        }
        if !(selection.chord_range_low.is_finite()
            && selection.chord_range_high.is_finite()
            && selection.chord_range_low <= selection.chord_range_high)
        {
            return Err(ConfigError::Invalid(format!(
                "selection chord range {}..={} is not a finite ascending range",
                selection.chord_range_low, selection.chord_range_high
            )));
        }
        if self.defaults.tempo_bpm == 0 || self.defaults.numerator == 0 {
            return Err(ConfigError::Invalid(
                "defaults.tempo_bpm and defaults.numerator must be positive".into(),
            ));
        }
        if let Some((id, _)) = self
            .overrides
            .time_signatures
            .iter()
            .find(|(_, ts)| ts.numerator == 0 || ts.denominator == 0)
        {
            return Err(ConfigError::Invalid(format!(
                "time signature override for {id} has a zero field"
            )));
        }
        if self.batch.max_concurrent == 0 || self.batch.song_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "batch.max_concurrent and batch.song_timeout_ms must be positive".into(),
            ));
        }
        if self.difficulty.advanced_at < self.difficulty.intermediate_at {
            return Err(ConfigError::Invalid(
                "difficulty.advanced_at must not be below difficulty.intermediate_at".into(),
            ));
        }
        Ok(())
    }

    /// Serialize config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SheetConfig::default();
        assert_eq!(config.sections.max_bars, 32);
        assert_eq!(config.chords.simultaneity_window_ms, 100.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let config = SheetConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[sections]"));
        assert!(text.contains("[quality]"));
        let parsed = SheetConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SheetConfig::from_toml_str(
            r#"
[sections]
max_bars = 16
"#,
        )
        .unwrap();
        assert_eq!(config.sections.max_bars, 16);
        assert_eq!(config.sections.short_section_bars, 8);
        assert_eq!(config.quality.min_distinct_chords, 3);
    }

    #[test]
    fn test_zero_max_bars_rejected() {
        let err = SheetConfig::from_toml_str("[sections]\nmax_bars = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let err =
            SheetConfig::from_toml_str("[quality]\nmin_key_confidence = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("min_key_confidence"));
    }

    #[test]
    fn test_zero_song_bar_limit_rejected() {
        let err = SheetConfig::from_toml_str("[sections]\nmax_song_bars = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_song_bars"));
    }

    #[test]
    fn test_non_finite_chord_settings_rejected() {
        for (field, value) in [
            ("simultaneity_window_ms", f64::NAN),
            ("simultaneity_window_ms", f64::INFINITY),
            ("simultaneity_window_ms", -5.0),
            ("final_chord_beats", f64::NAN),
            ("final_chord_beats", f64::INFINITY),
            ("final_chord_beats", 0.0),
        ] {
            let mut config = SheetConfig::default();
            match field {
                "simultaneity_window_ms" => config.chords.simultaneity_window_ms = value,
                _ => config.chords.final_chord_beats = value,
            }
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains(field), "{field} = {value}: {err}");
        }
    }

    #[test]
    fn test_infinite_window_from_toml_rejected() {
        let err =
            SheetConfig::from_toml_str("[chords]\nsimultaneity_window_ms = inf\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_selection_weights_rejected() {
        let mut config = SheetConfig::default();
        config.selection.bass_weight = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SheetConfig::default();
        config.selection.chord_range_weight = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = SheetConfig::default();
        config.selection.chord_range_low = 80.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chord range"), "{err}");
    }
}
