// SPDX-License-Identifier: Apache-2.0

//! Security scan types and data structures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity level of a finding.
///
/// Variants are declared from most to least severe, so the derived ordering
/// sorts critical issues first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Critical security vulnerability requiring immediate attention.
    Critical,
    /// High severity issue that should be addressed soon.
    High,
    /// Medium severity issue.
    Medium,
    /// Low severity issue.
    #[default]
    Low,
    /// Informational finding.
    Info,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    /// Uppercase label (`CRITICAL`, `HIGH`, ...).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::Info => "INFO",
        }
    }

    /// Score penalty applied per issue of this severity.
    #[must_use]
    pub fn score_penalty(self) -> u32 {
        match self {
            Severity::Critical => 20,
            Severity::High => 10,
            Severity::Medium => 5,
            Severity::Low => 2,
            Severity::Info => 0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Ok(Severity::Critical),
            "HIGH" => Ok(Severity::High),
            "MEDIUM" => Ok(Severity::Medium),
            "LOW" => Ok(Severity::Low),
            "INFO" => Ok(Severity::Info),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Category an issue is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Security vulnerabilities.
    #[default]
    Security,
    /// Performance problems.
    Performance,
    /// General code quality.
    Quality,
    /// Deviations from best practice.
    BestPractice,
    /// Maintainability (complexity, size).
    Maintainability,
}

impl Category {
    /// Uppercase label (`SECURITY`, `BEST_PRACTICE`, ...).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Security => "SECURITY",
            Category::Performance => "PERFORMANCE",
            Category::Quality => "QUALITY",
            Category::BestPractice => "BEST_PRACTICE",
            Category::Maintainability => "MAINTAINABILITY",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A security finding from pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Finding {
    /// Rule ID of the pattern that matched.
    #[serde(default)]
    pub rule_id: String,
    /// Short title (the pattern name).
    #[serde(default)]
    pub title: String,
    /// Human-readable description of the issue.
    #[serde(default)]
    pub description: String,
    /// Severity level.
    #[serde(default)]
    pub severity: Severity,
    /// Category of the pattern.
    #[serde(default)]
    pub category: Category,
    /// File path where the finding was detected.
    #[serde(default)]
    pub file_path: String,
    /// Line number in the file (1-indexed).
    #[serde(default)]
    pub line_number: usize,
    /// The trimmed source line.
    #[serde(default)]
    pub snippet: String,
    /// Suggested remediation.
    #[serde(default)]
    pub suggested_fix: String,
    /// Optional CWE identifier (e.g., "CWE-798").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwe: Option<String>,
    /// Optional OWASP Top 10 category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owasp: Option<String>,
}

/// Pattern definition for security scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternDefinition {
    /// Explicit rule identifier; derived from `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Short name, shown as the issue title.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Regex pattern to match against a single line.
    pub pattern: String,
    /// Severity level for matches.
    pub severity: Severity,
    /// Category for matches.
    #[serde(default)]
    pub category: Category,
    /// Suggested remediation.
    pub suggested_fix: String,
    /// Optional CWE identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwe: Option<String>,
    /// Optional OWASP Top 10 category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owasp: Option<String>,
    /// Languages this pattern applies to (empty = all languages).
    #[serde(default)]
    pub languages: Vec<String>,
    /// A match is discarded when this regex matches right after it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_followed_by: Option<String>,
}

impl PatternDefinition {
    /// Rule identifier used by `rules.disable` and severity overrides.
    #[must_use]
    pub fn rule_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| slugify(&self.name))
    }

    /// Whether the pattern applies to every language.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        self.languages.is_empty()
    }
}

/// Turns a rule name into an identifier: lowercase, whitespace runs become
/// `-`, anything outside `[a-z0-9-]` is dropped.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            slug.push(ch);
        }
    }
    slug
}
