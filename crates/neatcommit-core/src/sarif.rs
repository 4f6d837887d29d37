// SPDX-License-Identifier: Apache-2.0

//! SARIF (Static Analysis Results Interchange Format) output support.
//!
//! Converts analysis reports and diff findings to SARIF 2.1.0 for GitHub
//! Code Scanning and other tools that consume it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::analysis::{AnalysisReport, DiffReport};
use crate::issue::Issue;
use crate::repo_config::RuleTarget;
use crate::security::types::{Category, Finding, Severity};

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

/// SARIF report structure (SARIF 2.1.0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifReport {
    /// SARIF schema version.
    pub version: String,
    /// SARIF schema URI.
    #[serde(rename = "$schema")]
    pub schema: String,
    /// List of runs (one per tool invocation).
    pub runs: Vec<SarifRun>,
}

/// A single run of a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifRun {
    /// Tool information.
    pub tool: SarifTool,
    /// List of results.
    pub results: Vec<SarifResult>,
}

/// Tool information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifTool {
    /// Driver (the tool itself).
    pub driver: SarifDriver,
}

/// Tool driver information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    /// Tool name.
    pub name: String,
    /// Tool version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Information URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information_uri: Option<String>,
    /// Rules referenced by the results, sorted by id.
    #[serde(default)]
    pub rules: Vec<SarifRule>,
}

/// Rule metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    /// Rule id, matching `ruleId` of results.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// One-line description.
    pub short_description: SarifMessage,
    /// Remediation advice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<SarifMessage>,
    /// Category, CWE and OWASP references.
    pub properties: SarifRuleProperties,
}

/// Free-form rule properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifRuleProperties {
    /// Tags such as the category.
    pub tags: Vec<String>,
    /// CWE identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwe: Option<String>,
    /// OWASP Top 10 category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owasp: Option<String>,
}

/// A single result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    /// Rule ID that triggered this result.
    pub rule_id: String,
    /// Result level (note, warning, error).
    pub level: String,
    /// Human-readable message.
    pub message: SarifMessage,
    /// Locations where the issue was found.
    pub locations: Vec<SarifLocation>,
    /// Stable fingerprint for deduplication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprints: Option<SarifFingerprints>,
}

/// Message structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifMessage {
    /// Message text.
    pub text: String,
}

/// Location information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    /// Physical location in source code.
    pub physical_location: SarifPhysicalLocation,
}

/// Physical location in source code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    /// Artifact (file) location.
    pub artifact_location: SarifArtifactLocation,
    /// Region (line) information.
    pub region: SarifRegion,
}

/// Artifact location (file path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifArtifactLocation {
    /// File URI or path.
    pub uri: String,
}

/// Region information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    /// Start line (1-indexed).
    pub start_line: usize,
}

/// Fingerprints for deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifFingerprints {
    /// SHA-256 of `path:line:rule_id`.
    #[serde(rename = "primaryLocationLineHash")]
    pub primary_location_line_hash: String,
}

/// SARIF level for a severity.
#[must_use]
pub fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low | Severity::Info => "note",
    }
}

/// Hex SHA-256 of `path:line:rule_id`.
#[must_use]
pub fn fingerprint(path: &str, line: usize, rule_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{path}:{line}:{rule_id}").as_bytes());
    hex::encode(hasher.finalize())
}

/// Everything a result and its rule need, borrowed from a finding or issue.
struct Entry<'a> {
    rule_id: String,
    title: &'a str,
    description: &'a str,
    fix: Option<&'a str>,
    severity: Severity,
    category: Category,
    cwe: Option<&'a str>,
    owasp: Option<&'a str>,
    path: &'a str,
    line: usize,
}

impl<'a> Entry<'a> {
    fn from_finding(finding: &'a Finding) -> Self {
        Self {
            rule_id: finding.rule_id.clone(),
            title: &finding.title,
            description: &finding.description,
            fix: Some(finding.suggested_fix.as_str()).filter(|fix| !fix.is_empty()),
            severity: finding.severity,
            category: finding.category,
            cwe: finding.cwe.as_deref(),
            owasp: finding.owasp.as_deref(),
            path: &finding.file_path,
            line: finding.line_number.max(1),
        }
    }

    fn from_issue(path: &'a str, issue: &'a Issue) -> Self {
        Self {
            rule_id: issue.rule_key(),
            title: &issue.title,
            description: &issue.description,
            fix: issue.suggested_fix.as_deref(),
            severity: issue.severity,
            category: issue.category,
            cwe: issue.cwe.as_deref(),
            owasp: issue.owasp.as_deref(),
            path,
            // SARIF lines start at 1.
            line: issue.line.unwrap_or(1).max(1),
        }
    }

    fn rule(&self) -> SarifRule {
        SarifRule {
            id: self.rule_id.clone(),
            name: self.title.to_string(),
            short_description: SarifMessage {
                text: self.title.to_string(),
            },
            help: self.fix.map(|fix| SarifMessage {
                text: fix.to_string(),
            }),
            properties: SarifRuleProperties {
                tags: vec![self.category.label().to_lowercase()],
                cwe: self.cwe.map(str::to_string),
                owasp: self.owasp.map(str::to_string),
            },
        }
    }

    fn result(&self) -> SarifResult {
        SarifResult {
            rule_id: self.rule_id.clone(),
            level: sarif_level(self.severity).to_string(),
            message: SarifMessage {
                text: format!("{}: {}", self.title, self.description),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation {
                        uri: self.path.to_string(),
                    },
                    region: SarifRegion {
                        start_line: self.line,
                    },
                },
            }],
            fingerprints: Some(SarifFingerprints {
                primary_location_line_hash: fingerprint(self.path, self.line, &self.rule_id),
            }),
        }
    }
}

fn build<'a>(entries: impl IntoIterator<Item = Entry<'a>>) -> SarifReport {
    let mut rules: BTreeMap<String, SarifRule> = BTreeMap::new();
    let mut results = Vec::new();

    for entry in entries {
        rules
            .entry(entry.rule_id.clone())
            .or_insert_with(|| entry.rule());
        results.push(entry.result());
    }

    SarifReport {
        version: "2.1.0".to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "neatcommit".to_string(),
                    version: Some(env!("CARGO_PKG_VERSION").to_string()),
                    information_uri: Some(env!("CARGO_PKG_REPOSITORY").to_string()),
                    rules: rules.into_values().collect(),
                },
            },
            results,
        }],
    }
}

impl From<&AnalysisReport> for SarifReport {
    fn from(report: &AnalysisReport) -> Self {
        build(
            report
                .issues()
                .map(|(path, issue)| Entry::from_issue(path, issue)),
        )
    }
}

impl From<&DiffReport> for SarifReport {
    fn from(report: &DiffReport) -> Self {
        build(report.findings.iter().map(Entry::from_finding))
    }
}

impl From<Vec<Finding>> for SarifReport {
    fn from(findings: Vec<Finding>) -> Self {
        build(findings.iter().map(Entry::from_finding))
    }
}
