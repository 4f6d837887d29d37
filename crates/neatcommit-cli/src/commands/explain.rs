// SPDX-License-Identifier: Apache-2.0

//! Explain command: review comments with suggested fixes for one file.

use std::path::Path;

use anyhow::{Context, Result};
use neatcommit_core::{
    AppConfig, Analyzer, FileAnalysis, format_inline_comment, replacement_line_for,
};

use super::scan::{resolve_repo_config, scan_root};
use super::types::ExplainResult;

/// Builds one inline comment per issue, quoting the offending line.
pub fn comments_for(analysis: &FileAnalysis, content: &str) -> Vec<String> {
    let lines: Vec<&str> = content.lines().collect();

    analysis
        .issues
        .iter()
        .map(|issue| {
            let source_line = issue
                .line
                .and_then(|line| line.checked_sub(1))
                .and_then(|index| lines.get(index))
                .copied();
            let replacement = source_line.and_then(|line| replacement_line_for(issue, line));
            let snippet = source_line
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .or(issue.snippet.as_deref());
            format_inline_comment(issue, analysis.language, snippet, replacement.as_deref())
        })
        .collect()
}

/// Runs the explain command.
pub fn run(file: &Path, config: &AppConfig) -> Result<ExplainResult> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let root = scan_root(&[file.to_path_buf()]);
    let repo_config = resolve_repo_config(None, &root)?;
    let analyzer = Analyzer::new(repo_config, config.analysis.clone());

    let path = file.to_string_lossy();
    let analysis = analyzer.analyze_file(&path, &content);
    let comments = comments_for(&analysis, &content);

    Ok(ExplainResult {
        file: analysis,
        comments,
    })
}
