//! Tunables for the shaping pipelines, loaded from JSON.
//!
//! Every field has a default, so an empty object (or no file at all) yields
//! the stock configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::series::DEFAULT_DOWNSAMPLE_FACTOR;

/// Display point budget for one live-bytes chart.
pub const DEFAULT_MAX_BINS: usize = 700;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {field} {reason}")]
    Invalid { field: String, reason: String },
}

/// Sizing of one [`VirtualWindow`](crate::window::VirtualWindow).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Rows materialized when a selection is opened.
    pub initial_capacity: usize,
    /// Rows fetched per scroll-triggered load.
    pub page_size: usize,
    /// Scroll percentage above which the next page loads. Below
    /// `100 - high_threshold` the previous page loads.
    pub high_threshold: f64,
}

impl WindowConfig {
    /// Allocation intervals of the selected trace.
    pub const CHUNKS: Self = Self {
        initial_capacity: 200,
        page_size: 25,
        high_threshold: 90.0,
    };

    /// The sorted trace list.
    pub const TRACES: Self = Self {
        initial_capacity: 20,
        page_size: 20,
        high_threshold: 90.0,
    };

    fn validate(&self, window: &str) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(invalid(format!("{window}.initial_capacity"), "must be positive"));
        }
        if self.page_size == 0 {
            return Err(invalid(format!("{window}.page_size"), "must be positive"));
        }
        if !(self.high_threshold > 50.0 && self.high_threshold < 100.0) {
            return Err(invalid(
                format!("{window}.high_threshold"),
                format!("must lie strictly between 50 and 100, got {}", self.high_threshold),
            ));
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::CHUNKS
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawShapingConfig")]
pub struct ShapingConfig {
    pub max_bins: usize,
    /// Series shorter than `downsample_factor * max_bins` skip downsampling.
    pub downsample_factor: usize,
    pub chunk_window: WindowConfig,
    pub trace_window: WindowConfig,
}

impl Default for ShapingConfig {
    fn default() -> Self {
        Self {
            max_bins: DEFAULT_MAX_BINS,
            downsample_factor: DEFAULT_DOWNSAMPLE_FACTOR,
            chunk_window: WindowConfig::CHUNKS,
            trace_window: WindowConfig::TRACES,
        }
    }
}

/// On-disk shape: each window falls back to its own defaults field by field.
#[derive(Default, Deserialize)]
#[serde(default)]
struct RawShapingConfig {
    max_bins: Option<usize>,
    downsample_factor: Option<usize>,
    chunk_window: WindowOverrides,
    trace_window: WindowOverrides,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct WindowOverrides {
    initial_capacity: Option<usize>,
    page_size: Option<usize>,
    high_threshold: Option<f64>,
}

impl WindowOverrides {
    fn apply(self, base: WindowConfig) -> WindowConfig {
        WindowConfig {
            initial_capacity: self.initial_capacity.unwrap_or(base.initial_capacity),
            page_size: self.page_size.unwrap_or(base.page_size),
            high_threshold: self.high_threshold.unwrap_or(base.high_threshold),
        }
    }
}

impl From<RawShapingConfig> for ShapingConfig {
    fn from(raw: RawShapingConfig) -> Self {
        Self {
            max_bins: raw.max_bins.unwrap_or(DEFAULT_MAX_BINS),
            downsample_factor: raw.downsample_factor.unwrap_or(DEFAULT_DOWNSAMPLE_FACTOR),
            chunk_window: raw.chunk_window.apply(WindowConfig::CHUNKS),
            trace_window: raw.trace_window.apply(WindowConfig::TRACES),
        }
    }
}

impl ShapingConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bins == 0 {
            return Err(invalid("max_bins", "must be positive"));
        }
        if self.downsample_factor == 0 {
            return Err(invalid("downsample_factor", "must be positive"));
        }
        self.chunk_window.validate("chunk_window")?;
        self.trace_window.validate("trace_window")
    }
}
