// SPDX-License-Identifier: Apache-2.0

//! Diff command: scan the added lines of a unified diff.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use neatcommit_core::{AppConfig, Analyzer};

use super::scan::resolve_repo_config;
use super::types::DiffResult;

/// Reads the diff from `input`, or stdin for `-`.
fn read_diff(input: &str) -> Result<String> {
    if input == "-" {
        let mut diff = String::new();
        std::io::stdin()
            .read_to_string(&mut diff)
            .context("Failed to read diff from stdin")?;
        Ok(diff)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read diff {input}"))
    }
}

/// Runs the diff command. The repository config is looked up in the
/// current directory unless given explicitly.
pub fn run(input: &str, repo_config: Option<&Path>, config: &AppConfig) -> Result<DiffResult> {
    let diff = read_diff(input)?;
    let repo_config = resolve_repo_config(repo_config, Path::new("."))?;
    let analyzer = Analyzer::new(repo_config, config.analysis.clone());

    Ok(DiffResult {
        report: analyzer.analyze_diff(&diff),
    })
}
