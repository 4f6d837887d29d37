// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # NeatCommit Core
//!
//! Core library for the NeatCommit CLI - pattern-based code review.
//!
//! This crate provides reusable components for:
//! - Regex security scanning of files and unified diffs
//! - Code structure extraction with tree-sitter
//! - Code smell, duplicate block and infrastructure-as-code checks
//! - Scoring, technical debt grades and quality gates
//! - Markdown review comments and SARIF export
//! - Configuration management and result caching
//!
//! ## Quick Start
//!
//! ```rust
//! use neatcommit_core::{Analyzer, SourceFile, format_summary_comment};
//!
//! let analyzer = Analyzer::default();
//! let report = analyzer.analyze_files(&[SourceFile::new(
//!     "src/db.py",
//!     "password = \"hunter2\"\n",
//! )]);
//!
//! assert_eq!(report.counts.critical, 1);
//! assert!(!report.quality_gate.passed);
//! println!("{}", format_summary_comment(&report, Some(7)));
//! ```
//!
//! ## Modules
//!
//! - [`analysis`] - Per-file and multi-file analysis
//! - [`security`] - Pattern engine and diff scanner
//! - [`structure`] - Functions, classes and complexity
//! - [`quality`] / [`iac`] - Additional checks
//! - [`repo_config`] - `.neatcommit.yml`
//! - [`report`] / [`sarif`] - Output formats
//! - [`config`] - Application configuration and paths

// ============================================================================
// Error Handling
// ============================================================================

pub use error::NeatcommitError;

/// Convenience Result type for NeatCommit operations.
///
/// This is equivalent to `std::result::Result<T, NeatcommitError>`.
pub type Result<T> = std::result::Result<T, NeatcommitError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AnalysisConfig, AppConfig, CacheConfig, ScanConfig, UiConfig, cache_dir, config_dir,
    config_file_path, load_config,
};
pub use repo_config::{
    QualityGateResult, REPO_CONFIG_FILES, RepoConfig, load_repo_config, parse_repo_config,
    parse_repo_config_strict,
};

// ============================================================================
// Analysis
// ============================================================================

pub use analysis::{AnalysisReport, Analyzer, DiffReport, FileAnalysis, SourceFile};
pub use issue::{Issue, IssueSource, SeverityCounts};
pub use language::{
    Language, LanguageInfo, detect_language, is_language_supported, supported_extensions,
    supported_languages,
};
pub use maintainability::{Grade, Maintainability};
pub use security::{Category, Finding, PatternEngine, SecurityScanner, Severity};
pub use structure::{CodeStructure, parse_structure};

// ============================================================================
// Output
// ============================================================================

pub use report::{
    format_file_comment, format_inline_comment, format_summary_comment, replacement_line_for,
};
pub use sarif::SarifReport;

// ============================================================================
// Caching
// ============================================================================

pub use cache::{AnalysisCache, CacheEntry};

// ============================================================================
// Modules
// ============================================================================

pub mod analysis;
pub mod cache;
pub mod config;
pub mod error;
pub mod iac;
pub mod issue;
pub mod language;
pub mod maintainability;
pub mod quality;
pub mod repo_config;
pub mod report;
pub mod sarif;
pub mod security;
pub mod structure;
