//! TOML configuration for expression thresholds and pseudo-bulk aggregation.
//!
//! Every setting has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! # scexpr.toml
//! [sparsity]
//! threshold = 0.0
//!
//! [aggregate]
//! log2cpm = true
//! adjust_library_sizes = false
//! compute_sparsity_metrics = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure for scexpr.toml files.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    /// Expression threshold settings.
    #[serde(default)]
    pub sparsity: SparsityConfig,

    /// Pseudo-bulk aggregation settings.
    #[serde(default)]
    pub aggregate: AggregateConfig,
}

/// Configuration of the "is expressed" predicate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SparsityConfig {
    /// Linear-scale value a measurement must exceed to count as expressed.
    #[serde(default)]
    pub threshold: f64,
}

/// Configuration of pseudo-bulk aggregation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Convert aggregates to log2 counts per million when the scale allows it.
    pub log2cpm: bool,

    /// Scale library sizes by the sequencing depth declared on source samples.
    pub adjust_library_sizes: bool,

    /// Compute sparsity metrics for every aggregated sample.
    pub compute_sparsity_metrics: bool,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            log2cpm: true,
            adjust_library_sizes: false,
            compute_sparsity_metrics: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
