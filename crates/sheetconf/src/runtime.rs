//! Runtime configuration - how batches are scheduled and logged.

use serde::{Deserialize, Serialize};

/// Batch scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Songs converted at once.
    /// Default: available parallelism
    #[serde(default = "BatchConfig::default_max_concurrent")]
    pub max_concurrent: usize,

    /// Per-song wall clock budget; a song over budget is rejected as timed out.
    /// Default: 10000
    #[serde(default = "BatchConfig::default_song_timeout_ms")]
    pub song_timeout_ms: u64,
}

impl BatchConfig {
    fn default_max_concurrent() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }

    fn default_song_timeout_ms() -> u64 {
        10_000
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: Self::default_max_concurrent(),
            song_timeout_ms: Self::default_song_timeout_ms(),
        }
    }
}

/// Logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log filter directive, e.g. "info" or "song_understand=debug".
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}
