// SPDX-License-Identifier: Apache-2.0

//! The issue type shared by every check.

use serde::{Deserialize, Serialize};

use crate::repo_config::RuleTarget;
use crate::security::types::{Category, Finding, Severity};

/// Which check produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssueSource {
    /// Regex security patterns.
    #[default]
    Security,
    /// Code smells and duplicates.
    Quality,
    /// Infrastructure-as-code checks.
    Iac,
}

impl IssueSource {
    /// Label used in review comments.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            IssueSource::Security => "Security Scanner",
            IssueSource::Quality => "Quality Check",
            IssueSource::Iac => "IaC Check",
        }
    }
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Issue {
    /// How serious the issue is.
    pub severity: Severity,
    /// Category used for toggles and scoring.
    pub category: Category,
    /// Short title, also the fallback rule key.
    pub title: String,
    /// What is wrong.
    pub description: String,
    /// 1-based line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// 0-based column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// Offending source line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// How to fix it; may be a line of code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    /// Longer background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Pattern rule id, for security issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    /// CWE identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwe: Option<String>,
    /// OWASP Top 10 category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owasp: Option<String>,
    /// Check that produced the issue.
    pub source: IssueSource,
}

impl Issue {
    /// Creates an issue without location or fix.
    #[must_use]
    pub fn new(
        source: IssueSource,
        severity: Severity,
        category: Category,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            title: title.into(),
            description: description.into(),
            source,
            ..Self::default()
        }
    }

    /// Sets the 1-based line.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Sets the suggested fix.
    #[must_use]
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }
}

impl From<Finding> for Issue {
    fn from(finding: Finding) -> Self {
        Self {
            severity: finding.severity,
            category: finding.category,
            title: finding.title,
            description: finding.description,
            line: Some(finding.line_number),
            column: None,
            snippet: Some(finding.snippet),
            suggested_fix: Some(finding.suggested_fix).filter(|fix| !fix.is_empty()),
            explanation: None,
            rule_id: Some(finding.rule_id),
            cwe: finding.cwe,
            owasp: finding.owasp,
            source: IssueSource::Security,
        }
    }
}

impl RuleTarget for Issue {
    fn rule_id(&self) -> Option<&str> {
        self.rule_id.as_deref()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn category(&self) -> Category {
        self.category
    }

    fn set_severity(&mut self, severity: Severity) {
        self.severity = severity;
    }
}

/// Issue counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeverityCounts {
    /// Counts the given severities.
    pub fn tally(severities: impl IntoIterator<Item = Severity>) -> Self {
        let mut counts = Self::default();
        for severity in severities {
            counts.add(severity);
        }
        counts
    }

    /// Adds one issue.
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Info => self.info += 1,
        }
    }

    /// Count for one severity.
    #[must_use]
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }

    /// All issues.
    #[must_use]
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.info
    }
}

impl std::ops::AddAssign for SeverityCounts {
    fn add_assign(&mut self, other: Self) {
        self.critical += other.critical;
        self.high += other.high;
        self.medium += other.medium;
        self.low += other.low;
        self.info += other.info;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_finding() {
        let finding = Finding {
            rule_id: "use-of-unsafepointer".to_string(),
            title: "Use of unsafe.Pointer".to_string(),
            description: "unsafe.Pointer bypasses type safety".to_string(),
            severity: Severity::Medium,
            category: Category::Security,
            file_path: "main.go".to_string(),
            line_number: 33,
            snippet: "var ptr unsafe.Pointer".to_string(),
            suggested_fix: String::new(),
            cwe: Some("CWE-20".to_string()),
            owasp: None,
        };

        let issue = Issue::from(finding);
        assert_eq!(issue.source, IssueSource::Security);
        assert_eq!(issue.line, Some(33));
        assert_eq!(issue.rule_id.as_deref(), Some("use-of-unsafepointer"));
        assert_eq!(issue.suggested_fix, None);
    }

    #[test]
    fn test_rule_key_falls_back_to_title() {
        let issue = Issue::new(
            IssueSource::Quality,
            Severity::Low,
            Category::Quality,
            "Duplicate code block",
            "",
        );
        assert_eq!(issue.rule_key(), "duplicate-code-block");
    }

    #[test]
    fn test_severity_counts() {
        let mut counts = SeverityCounts::tally([Severity::Critical, Severity::Low, Severity::Low]);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.get(Severity::Low), 2);
        counts += SeverityCounts::tally([Severity::Info]);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_source_serialization() {
        assert_eq!(serde_json::to_string(&IssueSource::Iac).unwrap(), "\"iac\"");
        assert_eq!(IssueSource::Quality.label(), "Quality Check");
    }
}
