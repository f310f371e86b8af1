//! Pipeline configuration
//!
//! Loaded from a TOML file passed with `--config` or `$EML_SIGNALS_CONFIG`.
//! Every section and field is optional; missing values fall back to the
//! built-in defaults. Command-line flags override file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level when neither `-v` nor `RUST_LOG` is given
    pub log_level: String,
    /// Input discovery settings
    pub input: InputConfig,
    /// Output settings
    pub output: OutputConfig,
}

/// Input discovery settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Only pick up files with this extension from input directories (e.g. "eml")
    pub extension: Option<String>,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Records file written by `parse` and `run`
    pub records_file: PathBuf,
    /// Truncate output files instead of appending
    pub overwrite: bool,
    /// Log progress every this many messages (0 disables)
    pub progress_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            records_file: PathBuf::from("default_out.jsonl"),
            overwrite: false,
            progress_interval: 1000,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str, path: &Path) -> Result<Self> {
        toml::from_str(contents).map_err(|e| PipelineError::Config {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
    }

    /// Load configuration from a file, or the defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let config = Self::from_toml(&contents, path)?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }
}
