// SPDX-License-Identifier: Apache-2.0

//! Configuration management for the NeatCommit CLI.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `NEATCOMMIT_`)
//! 2. Config file: `~/.config/neatcommit/config.toml`
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Report functions with more than six parameters only
//! NEATCOMMIT_ANALYSIS__MAX_PARAMS=6 neatcommit scan .
//! ```
//!
//! Repository-specific settings live in `.neatcommit.yml`, see
//! [`crate::repo_config`].

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::NeatcommitError;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// File discovery settings.
    pub scan: ScanConfig,
    /// Analysis thresholds.
    pub analysis: AnalysisConfig,
    /// Result cache settings.
    pub cache: CacheConfig,
    /// UI preferences.
    pub ui: UiConfig,
}

/// File discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Files larger than this are skipped.
    pub max_file_size_kb: u64,
    /// Include hidden files and directories.
    pub hidden: bool,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Worker threads for analysis (0 = one per CPU).
    pub threads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size_kb: 1024,
            hidden: false,
            follow_symlinks: false,
            threads: 0,
        }
    }
}

/// Analysis thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Functions with more parameters than this are reported.
    pub max_params: usize,
    /// Functions at or above this cyclomatic complexity are reported.
    pub high_complexity: u32,
    /// Lines per block for duplicate detection.
    pub duplicate_block_lines: usize,
    /// Cap on duplicate block issues per file.
    pub max_duplicate_issues: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_params: 4,
            high_complexity: 15,
            duplicate_block_lines: 5,
            max_duplicate_issues: 5,
        }
    }
}

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Reuse analysis results for unchanged files.
    pub enabled: bool,
    /// Cached results older than this are re-analyzed.
    pub ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_hours: 168,
        }
    }
}

/// UI preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Enable colored output.
    pub color: bool,
    /// Show progress spinners.
    pub progress_bars: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress_bars: true,
        }
    }
}

/// Returns the NeatCommit configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/neatcommit`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join("neatcommit");
    }
    dirs::home_dir()
        .unwrap_or_default()
        .join(".config")
        .join("neatcommit")
}

/// Returns the NeatCommit cache directory.
///
/// Respects the `XDG_CACHE_HOME` environment variable if set, otherwise
/// uses the platform cache directory (`~/.cache` on Linux).
#[must_use]
pub fn cache_dir() -> PathBuf {
    if let Ok(xdg_cache) = std::env::var("XDG_CACHE_HOME")
        && !xdg_cache.is_empty()
    {
        return PathBuf::from(xdg_cache).join("neatcommit");
    }
    dirs::cache_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".cache"))
        .join("neatcommit")
}

/// Returns the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application configuration.
///
/// Loads from config file (if exists) and environment variables.
/// Environment variables use the prefix `NEATCOMMIT_` and double underscore
/// for nested keys (e.g., `NEATCOMMIT_CACHE__ENABLED=false`).
///
/// # Errors
///
/// Returns `NeatcommitError::Config` if the config file exists but is invalid.
pub fn load_config() -> Result<AppConfig, NeatcommitError> {
    let config_path = config_file_path();

    let config = Config::builder()
        // Optional; a missing file means defaults
        .add_source(File::with_name(config_path.to_string_lossy().as_ref()).required(false))
        .add_source(
            Environment::with_prefix("NEATCOMMIT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    Ok(app_config)
}
