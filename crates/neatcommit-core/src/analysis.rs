// SPDX-License-Identifier: Apache-2.0

//! Per-file and multi-file analysis.
//!
//! [`Analyzer`] runs the security patterns, the quality checks and the IaC
//! checks over a file, merges their issues, applies the repository
//! configuration and scores the result. Multiple files are analyzed in
//! parallel with rayon.

use std::collections::HashSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{AnalysisCache, cache_key};
use crate::config::AnalysisConfig;
use crate::iac::{analyze_iac_file, is_iac_file};
use crate::issue::{Issue, SeverityCounts};
use crate::language::{Language, detect_language};
use crate::maintainability::Maintainability;
use crate::quality::analyze_quality;
use crate::repo_config::{QualityGateResult, RepoConfig};
use crate::security::patterns::PatternEngine;
use crate::security::scanner::{SecurityScanner, parse_diff};
use crate::security::types::{Category, Finding};
use crate::structure::{CodeStructure, parse_structure};

/// Files whose total complexity exceeds this are called out in the summary.
const SUMMARY_COMPLEXITY: u32 = 10;

/// A file to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the scanned root, `/`-separated.
    pub path: String,
    /// File content.
    pub content: String,
}

impl SourceFile {
    /// Creates a source file.
    #[must_use]
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Result of analyzing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnalysis {
    /// Analyzed path.
    pub path: String,
    /// Detected language.
    pub language: Language,
    /// False when the language is unknown and no IaC check applies.
    pub is_supported: bool,
    /// Functions, classes and imports.
    pub structure: CodeStructure,
    /// Issues sorted by severity, most severe first.
    pub issues: Vec<Issue>,
    /// 0..=100, from security-category issues only.
    pub score: u32,
    /// One-line summary.
    pub summary: String,
    /// Technical debt of the file.
    pub maintainability: Maintainability,
}

impl FileAnalysis {
    fn unsupported(path: &str, language: Language) -> Self {
        Self {
            path: path.to_string(),
            language,
            is_supported: false,
            structure: CodeStructure::default(),
            issues: Vec::new(),
            score: 0,
            summary: format!("Language {language} is not supported for analysis"),
            maintainability: Maintainability::default(),
        }
    }

    /// Issue counts per severity.
    #[must_use]
    pub fn counts(&self) -> SeverityCounts {
        SeverityCounts::tally(self.issues.iter().map(|issue| issue.severity))
    }
}

/// Score from security-category issues: 100 minus per-severity penalties,
/// clamped at 0.
#[must_use]
pub fn security_score(issues: &[Issue]) -> u32 {
    let penalty: u32 = issues
        .iter()
        .filter(|issue| issue.category == Category::Security)
        .map(|issue| issue.severity.score_penalty())
        .sum();
    100u32.saturating_sub(penalty)
}

fn summarize(structure: &CodeStructure, issues: &[Issue]) -> String {
    let mut parts = vec![format!(
        "Found {} functions, {} classes",
        structure.functions.len(),
        structure.classes.len()
    )];

    if structure.complexity > SUMMARY_COMPLEXITY {
        parts.push(format!("High complexity ({})", structure.complexity));
    }

    let security = SeverityCounts::tally(
        issues
            .iter()
            .filter(|issue| issue.category == Category::Security)
            .map(|issue| issue.severity),
    );
    if security.total() == 0 {
        parts.push("No security issues detected".to_string());
    } else {
        if security.critical > 0 {
            parts.push(format!("{} CRITICAL security issues", security.critical));
        }
        if security.high > 0 {
            parts.push(format!("{} HIGH security issues", security.high));
        }
    }

    format!("{}.", parts.join(". "))
}

/// Keeps the first issue for each (line, lowercase title) pair.
fn dedupe(issues: Vec<Issue>) -> Vec<Issue> {
    let mut seen = HashSet::new();
    issues
        .into_iter()
        .filter(|issue| seen.insert((issue.line, issue.title.to_lowercase())))
        .collect()
}

/// Aggregated result of a multi-file analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Per-file results in input order.
    pub files: Vec<FileAnalysis>,
    /// Files analyzed, supported or not.
    pub total_files: usize,
    /// Files whose language is supported.
    pub analyzed_files: usize,
    /// Issues per severity over all files.
    pub counts: SeverityCounts,
    /// Mean score of supported files, 100 when there are none.
    pub avg_score: f64,
    /// Technical debt over all issues.
    pub maintainability: Maintainability,
    /// Gate outcome.
    pub quality_gate: QualityGateResult,
}

impl AnalysisReport {
    /// Aggregates file results and evaluates the quality gate of `config`.
    #[must_use]
    pub fn new(files: Vec<FileAnalysis>, config: &RepoConfig) -> Self {
        let mut counts = SeverityCounts::default();
        for file in &files {
            counts += file.counts();
        }

        let scores: Vec<f64> = files
            .iter()
            .filter(|file| file.is_supported)
            .map(|file| f64::from(file.score))
            .collect();
        let avg_score = if scores.is_empty() {
            100.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        Self {
            total_files: files.len(),
            analyzed_files: scores.len(),
            quality_gate: config.quality_gate(counts.critical, avg_score),
            maintainability: Maintainability::from_counts(&counts),
            counts,
            avg_score,
            files,
        }
    }

    /// Every issue paired with its file path, in report order.
    pub fn issues(&self) -> impl Iterator<Item = (&str, &Issue)> {
        self.files
            .iter()
            .flat_map(|file| file.issues.iter().map(move |issue| (file.path.as_str(), issue)))
    }
}

/// Security findings of a unified diff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffReport {
    /// Findings on added lines, most severe first.
    pub findings: Vec<Finding>,
    /// Files with added lines that were scanned.
    pub files_scanned: usize,
    /// Findings per severity.
    pub counts: SeverityCounts,
    /// Critical-issue gate; diffs have no score.
    pub quality_gate: QualityGateResult,
}

/// Analyzes files according to a repository configuration.
#[derive(Debug)]
pub struct Analyzer {
    engine: &'static PatternEngine,
    scanner: SecurityScanner,
    analysis: AnalysisConfig,
    cache: Option<AnalysisCache>,
    settings_key: String,
}

impl Analyzer {
    /// Creates an analyzer.
    ///
    /// `duplication.minLines` from the repository configuration overrides the
    /// application's duplicate block size.
    #[must_use]
    pub fn new(repo_config: RepoConfig, mut analysis: AnalysisConfig) -> Self {
        if let Some(min_lines) = repo_config.duplication.min_lines {
            analysis.duplicate_block_lines = min_lines;
        }
        let settings_key = serde_json::json!({
            "repo": &repo_config,
            "analysis": &analysis,
        })
        .to_string();

        Self {
            engine: PatternEngine::global(),
            scanner: SecurityScanner::with_config(repo_config),
            analysis,
            cache: None,
            settings_key,
        }
    }

    /// Reuses results from `cache` for unchanged files.
    #[must_use]
    pub fn with_cache(mut self, cache: AnalysisCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The repository configuration in effect.
    #[must_use]
    pub fn repo_config(&self) -> &RepoConfig {
        self.scanner.config()
    }

    /// The effective analysis thresholds.
    #[must_use]
    pub fn analysis_config(&self) -> &AnalysisConfig {
        &self.analysis
    }

    /// Analyzes one file, consulting the cache when configured.
    ///
    /// Cache failures are logged and the file is analyzed afresh.
    #[must_use]
    pub fn analyze_file(&self, path: &str, content: &str) -> FileAnalysis {
        let Some(cache) = &self.cache else {
            return self.analyze_uncached(path, content);
        };

        let key = cache_key(&self.settings_key, path, content);
        match cache.get::<FileAnalysis>(&key) {
            Ok(Some(hit)) => {
                debug!(file = path, "Cache hit");
                return hit;
            }
            Ok(None) => {}
            Err(e) => warn!(file = path, error = %e, "Ignoring unreadable cache entry"),
        }

        let analysis = self.analyze_uncached(path, content);
        if let Err(e) = cache.put(&key, &analysis) {
            warn!(file = path, error = %e, "Failed to write cache entry");
        }
        analysis
    }

    fn analyze_uncached(&self, path: &str, content: &str) -> FileAnalysis {
        let language = detect_language(path).language;
        let iac = is_iac_file(path);

        if !language.is_supported() && !iac {
            debug!(file = path, %language, "Language not supported, skipping analysis");
            return FileAnalysis::unsupported(path, language);
        }

        let structure = parse_structure(content, path, language);

        let mut issues: Vec<Issue> = self
            .engine
            .scan(content, path, language)
            .into_iter()
            .map(Issue::from)
            .collect();
        let check_duplicates = !self.repo_config().is_duplication_ignored(path);
        issues.extend(analyze_quality(
            content,
            &structure,
            &self.analysis,
            check_duplicates,
        ));
        issues.extend(analyze_iac_file(content, path));

        let config = self.repo_config();
        let mut issues = config.apply_rules(config.filter_categories(dedupe(issues)));
        issues.sort_by_key(|issue| issue.severity);

        let score = security_score(&issues);
        let summary = summarize(&structure, &issues);
        let maintainability =
            Maintainability::from_counts(&SeverityCounts::tally(issues.iter().map(|i| i.severity)));

        debug!(
            file = path,
            functions = structure.functions.len(),
            issues = issues.len(),
            score,
            "File analysis completed"
        );

        FileAnalysis {
            path: path.to_string(),
            language,
            is_supported: true,
            structure,
            issues,
            score,
            summary,
            maintainability,
        }
    }

    /// Analyzes many files in parallel.
    ///
    /// Files matching `ignore.paths` are dropped; the rest keep their input
    /// order in the report.
    #[must_use]
    pub fn analyze_files(&self, files: &[SourceFile]) -> AnalysisReport {
        let results: Vec<FileAnalysis> = files
            .par_iter()
            .filter(|file| !self.repo_config().is_path_ignored(&file.path))
            .map(|file| self.analyze_file(&file.path, &file.content))
            .collect();

        let report = AnalysisReport::new(results, self.repo_config());
        info!(
            files = report.total_files,
            analyzed = report.analyzed_files,
            issues = report.counts.total(),
            score = report.avg_score,
            passed = report.quality_gate.passed,
            "Analysis completed"
        );
        report
    }

    /// Scans the added lines of a unified diff for security issues.
    #[must_use]
    pub fn analyze_diff(&self, diff: &str) -> DiffReport {
        let files = parse_diff(diff);
        let files_scanned = files
            .iter()
            .filter(|file| !file.added_lines.is_empty() && !self.repo_config().is_path_ignored(&file.path))
            .count();

        let mut findings = self.scanner.scan_diff_files(&files);
        findings.sort_by_key(|finding| finding.severity);

        let counts = SeverityCounts::tally(findings.iter().map(|f| f.severity));
        let quality_gate = self.repo_config().critical_gate(counts.critical);
        info!(
            files = files_scanned,
            findings = findings.len(),
            passed = quality_gate.passed,
            "Diff scan completed"
        );

        DiffReport {
            findings,
            files_scanned,
            counts,
            quality_gate,
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(RepoConfig::default(), AnalysisConfig::default())
    }
}
