// SPDX-License-Identifier: Apache-2.0

//! Result types returned by command handlers.
//!
//! Command handlers return data instead of printing directly; the output
//! module decides how each result is presented.

use std::path::PathBuf;

use neatcommit_core::{AnalysisReport, AppConfig, DiffReport, FileAnalysis, RepoConfig};
use serde::Serialize;

/// Result from the scan command.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// The analysis report.
    #[serde(flatten)]
    pub report: AnalysisReport,
    /// Files skipped as binary, oversized or unreadable.
    pub skipped_files: usize,
    /// Pull request number for the summary header.
    #[serde(skip)]
    pub pr: Option<u64>,
    /// Append per-file comments to markdown output.
    #[serde(skip)]
    pub file_comments: bool,
}

/// Result from the diff command.
#[derive(Debug, Clone, Serialize)]
pub struct DiffResult {
    /// Findings on added lines.
    #[serde(flatten)]
    pub report: DiffReport,
}

/// Result from the explain command.
#[derive(Debug, Clone, Serialize)]
pub struct ExplainResult {
    /// Analysis of the file.
    pub file: FileAnalysis,
    /// One Markdown review comment per issue, in issue order.
    pub comments: Vec<String>,
}

/// One row of the rules table.
#[derive(Debug, Clone, Serialize)]
pub struct RuleRow {
    /// Rule identifier.
    pub id: String,
    /// Rule name.
    pub name: String,
    /// Severity label.
    pub severity: String,
    /// Category label.
    pub category: String,
    /// Languages, empty for universal rules.
    pub languages: Vec<String>,
    /// CWE identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwe: Option<String>,
}

/// Result from the rules command.
#[derive(Debug, Clone, Serialize)]
pub struct RulesResult {
    /// Language filter that was applied (if any).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Matching rules in table order.
    pub rules: Vec<RuleRow>,
}

/// One row of the languages table.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageRow {
    /// Language identifier.
    pub name: String,
    /// Recognized extensions.
    pub extensions: Vec<String>,
    /// Whether functions and classes are extracted.
    pub structure: bool,
}

/// Result from the languages command.
#[derive(Debug, Clone, Serialize)]
pub struct LanguagesResult {
    /// Supported languages.
    pub languages: Vec<LanguageRow>,
}

/// Result from the config show command.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigShowResult {
    /// Configuration file path.
    pub path: PathBuf,
    /// Whether the file exists.
    pub exists: bool,
    /// Effective configuration.
    pub config: AppConfig,
}

/// Result from the config path command.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPathResult {
    /// Configuration file path.
    pub path: PathBuf,
}

/// Result from the config check command.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigCheckResult {
    /// Validated file, `None` when no file was found.
    pub path: Option<PathBuf>,
    /// The parsed configuration.
    pub config: RepoConfig,
}
