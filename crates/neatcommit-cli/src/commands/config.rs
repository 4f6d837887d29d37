// SPDX-License-Identifier: Apache-2.0

//! Config subcommands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use neatcommit_core::{AppConfig, REPO_CONFIG_FILES, RepoConfig, config_file_path};
use neatcommit_core::repo_config::parse_repo_config_strict;

use super::types::{ConfigCheckResult, ConfigPathResult, ConfigShowResult};

/// Shows the effective application configuration.
pub fn run_show(config: &AppConfig) -> ConfigShowResult {
    let path = config_file_path();
    ConfigShowResult {
        exists: path.is_file(),
        path,
        config: config.clone(),
    }
}

/// Shows the configuration file path.
pub fn run_path() -> ConfigPathResult {
    ConfigPathResult {
        path: config_file_path(),
    }
}

/// The `.neatcommit.yml` to validate: `path` itself when it is a file,
/// otherwise the first config file inside the directory.
fn locate_repo_config(path: Option<&Path>) -> Option<PathBuf> {
    let path = path.unwrap_or_else(|| Path::new("."));
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    REPO_CONFIG_FILES
        .iter()
        .map(|name| path.join(name))
        .find(|candidate| candidate.is_file())
}

/// Validates a repository configuration strictly.
///
/// A missing file is valid and yields the defaults.
pub fn run_check(path: Option<&Path>) -> Result<ConfigCheckResult> {
    let Some(file) = locate_repo_config(path) else {
        return Ok(ConfigCheckResult {
            path: None,
            config: RepoConfig::default(),
        });
    };

    let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let config = parse_repo_config_strict(&raw)
        .with_context(|| format!("Invalid repository config {}", file.display()))?;

    Ok(ConfigCheckResult {
        path: Some(file),
        config,
    })
}
