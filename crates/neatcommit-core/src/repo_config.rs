// SPDX-License-Identifier: Apache-2.0

//! Repository-level configuration (`.neatcommit.yml`).
//!
//! The file is optional. Parsing is lenient: every field that is missing,
//! wrongly typed or out of range keeps its default, and a file that is not
//! valid YAML at all yields the default configuration. [`parse_repo_config_strict`]
//! reports those problems instead, for `neatcommit config check`.
//!
//! ```yaml
//! categories:
//!   quality: false
//! qualityGate:
//!   blockOnCritical: true
//!   minScore: 70
//! ignore:
//!   paths: ["vendor/**", "*.min.js"]
//! rules:
//!   disable: [insecure-http]
//!   severityOverrides:
//!     use-of-unsafepointer: LOW
//! duplication:
//!   minLines: 6
//!   ignorePatterns: ["**/*_test.go"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::NeatcommitError;
use crate::security::types::{Category, Finding, Severity, slugify};

/// File names tried by [`load_repo_config`], in order.
pub const REPO_CONFIG_FILES: [&str; 2] = [".neatcommit.yml", ".neatcommit.yaml"];

/// Allowed range for `qualityGate.minScore`.
const MIN_SCORE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;
/// Allowed range for `duplication.minLines`.
const MIN_LINES_RANGE: std::ops::RangeInclusive<u64> = 3..=20;

/// Category toggles. All enabled by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryToggles {
    /// Security findings.
    pub security: bool,
    /// Quality and maintainability findings.
    pub quality: bool,
    /// Style findings (no built-in check produces these yet).
    pub style: bool,
    /// Performance findings.
    pub performance: bool,
    /// Best-practice findings.
    pub best_practice: bool,
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self {
            security: true,
            quality: true,
            style: true,
            performance: true,
            best_practice: true,
        }
    }
}

/// Quality gate settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityGateConfig {
    /// Fail the gate when any CRITICAL issue remains.
    pub block_on_critical: bool,
    /// Fail the gate when the average score drops below this value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
}

impl Default for QualityGateConfig {
    fn default() -> Self {
        Self {
            block_on_critical: true,
            min_score: None,
        }
    }
}

/// Paths excluded from analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IgnoreConfig {
    /// Gitignore-style globs.
    pub paths: Vec<String>,
}

/// Rule toggles and severity overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesConfig {
    /// Rule ids (or slugified titles) to drop.
    pub disable: Vec<String>,
    /// Replacement severity keyed by rule id or exact title.
    pub severity_overrides: BTreeMap<String, Severity>,
}

/// Duplicate block detection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicationConfig {
    /// Block size in lines; the application default applies when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_lines: Option<usize>,
    /// Files matching these globs skip the duplicate check.
    pub ignore_patterns: Vec<String>,
}

/// Outcome of the quality gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityGateResult {
    /// Whether the gate passed.
    pub passed: bool,
    /// Failed because critical issues remain.
    pub blocked_by_critical: bool,
    /// Failed because the average score is under `minScore`.
    pub below_min_score: bool,
}

impl QualityGateResult {
    /// Human-readable reasons, empty when the gate passed.
    #[must_use]
    pub fn reasons(&self) -> Vec<&'static str> {
        let mut reasons = Vec::new();
        if self.blocked_by_critical {
            reasons.push("**Critical issues** must be resolved before merge.");
        }
        if self.below_min_score {
            reasons.push("**Minimum score** threshold not met.");
        }
        reasons
    }
}

/// Anything the rules configuration can filter or re-rank.
pub trait RuleTarget {
    /// Explicit rule id, if the producer assigned one.
    fn rule_id(&self) -> Option<&str>;
    /// Issue title.
    fn title(&self) -> &str;
    /// Category used for category toggles.
    fn category(&self) -> Category;
    /// Replaces the severity.
    fn set_severity(&mut self, severity: Severity);

    /// Id matched against `rules.disable`: the rule id, else the slugified title.
    fn rule_key(&self) -> String {
        self.rule_id()
            .map_or_else(|| slugify(self.title()), str::to_string)
    }
}

impl RuleTarget for Finding {
    fn rule_id(&self) -> Option<&str> {
        Some(&self.rule_id)
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

/// Compiled glob list.
#[derive(Debug, Clone, Default)]
struct PathGlobs {
    matcher: Option<Gitignore>,
}

impl PathGlobs {
    fn compile(patterns: &[String], problems: &mut Vec<NeatcommitError>) -> Self {
        if patterns.is_empty() {
            return Self::default();
        }

        let mut builder = GitignoreBuilder::new("");
        for pattern in patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                problems.push(NeatcommitError::InvalidGlob {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                });
            }
        }

        match builder.build() {
            Ok(matcher) => Self {
                matcher: Some(matcher),
            },
            Err(e) => {
                problems.push(NeatcommitError::InvalidGlob {
                    pattern: patterns.join(", "),
                    message: e.to_string(),
                });
                Self::default()
            }
        }
    }

    fn is_match(&self, path: &str) -> bool {
        let Some(matcher) = &self.matcher else {
            return false;
        };
        let relative = normalize_path(path);
        if relative.is_empty() {
            return false;
        }
        matcher
            .matched_path_or_any_parents(relative, false)
            .is_ignore()
    }
}

/// Strips `./` and leading separators so globs apply relative to the repo root.
fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut rest = unified.as_str();
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        } else {
            break;
        }
    }
    rest.to_string()
}

/// Parsed `.neatcommit.yml`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoConfig {
    /// Category toggles.
    pub categories: CategoryToggles,
    /// Quality gate.
    pub quality_gate: QualityGateConfig,
    /// Ignored paths.
    pub ignore: IgnoreConfig,
    /// Rule toggles.
    pub rules: RulesConfig,
    /// Duplicate detection.
    pub duplication: DuplicationConfig,
    #[serde(skip)]
    ignored_paths: PathGlobs,
    #[serde(skip)]
    duplication_ignored: PathGlobs,
}

impl RepoConfig {
    /// Whether `path` matches `ignore.paths`.
    #[must_use]
    pub fn is_path_ignored(&self, path: &str) -> bool {
        self.ignored_paths.is_match(path)
    }

    /// Whether `path` matches `duplication.ignorePatterns`.
    #[must_use]
    pub fn is_duplication_ignored(&self, path: &str) -> bool {
        self.duplication_ignored.is_match(path)
    }

    /// Whether issues of `category` should be reported.
    #[must_use]
    pub fn is_category_enabled(&self, category: Category) -> bool {
        let toggles = &self.categories;
        match category {
            Category::Security => toggles.security,
            Category::Performance => toggles.performance,
            Category::BestPractice => toggles.best_practice,
            Category::Quality | Category::Maintainability => toggles.quality,
        }
    }

    /// Drops issues whose category is disabled.
    #[must_use]
    pub fn filter_categories<T: RuleTarget>(&self, issues: Vec<T>) -> Vec<T> {
        issues
            .into_iter()
            .filter(|issue| self.is_category_enabled(issue.category()))
            .collect()
    }

    /// Drops disabled rules, then applies severity overrides (rule id first,
    /// then exact title).
    #[must_use]
    pub fn apply_rules<T: RuleTarget>(&self, issues: Vec<T>) -> Vec<T> {
        let rules = &self.rules;
        if rules.disable.is_empty() && rules.severity_overrides.is_empty() {
            return issues;
        }

        let disabled: Vec<String> = rules.disable.iter().map(|id| id.to_lowercase()).collect();

        issues
            .into_iter()
            .filter(|issue| !disabled.contains(&issue.rule_key().to_lowercase()))
            .map(|mut issue| {
                let overridden = issue
                    .rule_id()
                    .and_then(|id| rules.severity_overrides.get(id))
                    .or_else(|| rules.severity_overrides.get(issue.title()))
                    .copied();
                if let Some(severity) = overridden {
                    issue.set_severity(severity);
                }
                issue
            })
            .collect()
    }

    /// Evaluates the quality gate.
    #[must_use]
    pub fn quality_gate(&self, critical_count: usize, avg_score: f64) -> QualityGateResult {
        let gate = &self.quality_gate;
        let blocked_by_critical = gate.block_on_critical && critical_count > 0;
        let below_min_score = gate.min_score.is_some_and(|min| avg_score < min);
        QualityGateResult {
            passed: !blocked_by_critical && !below_min_score,
            blocked_by_critical,
            below_min_score,
        }
    }

    /// Evaluates only the critical-issue part of the gate, for diffs where
    /// no score is computed.
    #[must_use]
    pub fn critical_gate(&self, critical_count: usize) -> QualityGateResult {
        let blocked_by_critical = self.quality_gate.block_on_critical && critical_count > 0;
        QualityGateResult {
            passed: !blocked_by_critical,
            blocked_by_critical,
            below_min_score: false,
        }
    }
}

/// Parses `.neatcommit.yml` content, falling back to defaults.
///
/// Invalid YAML yields the default configuration; individual invalid fields
/// keep their defaults. Problems are logged at warn level.
#[must_use]
pub fn parse_repo_config(raw: &str) -> RepoConfig {
    match parse_with_problems(raw) {
        Ok((config, problems)) => {
            for problem in &problems {
                warn!(error = %problem, "Ignoring invalid .neatcommit.yml value");
            }
            config
        }
        Err(e) => {
            warn!(error = %e, "Failed to parse .neatcommit.yml, using defaults");
            RepoConfig::default()
        }
    }
}

/// Parses `.neatcommit.yml` content, rejecting anything the lenient parser
/// would silently drop.
///
/// # Errors
///
/// Returns the first YAML, type, range or glob problem found.
pub fn parse_repo_config_strict(raw: &str) -> crate::Result<RepoConfig> {
    let (config, problems) = parse_with_problems(raw)?;
    match problems.into_iter().next() {
        Some(problem) => Err(problem),
        None => Ok(config),
    }
}

/// Loads the repository configuration from `root`.
///
/// A missing file gives the default configuration.
///
/// # Errors
///
/// Returns an error only when an existing file cannot be read.
pub fn load_repo_config(root: &Path) -> crate::Result<RepoConfig> {
    for name in REPO_CONFIG_FILES {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| NeatcommitError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded repository config");
        return Ok(parse_repo_config(&raw));
    }
    Ok(RepoConfig::default())
}

fn inline_error(message: impl Into<String>) -> NeatcommitError {
    NeatcommitError::RepoConfig {
        path: "<inline>".to_string(),
        message: message.into(),
    }
}

fn parse_with_problems(raw: &str) -> crate::Result<(RepoConfig, Vec<NeatcommitError>)> {
    if raw.trim().is_empty() {
        return Ok((RepoConfig::default(), Vec::new()));
    }

    let doc: Value = serde_saphyr::from_str(raw).map_err(|e| inline_error(e.to_string()))?;
    let root = match doc {
        Value::Object(map) => map,
        Value::Null => return Ok((RepoConfig::default(), Vec::new())),
        _ => return Err(inline_error("top level must be a mapping")),
    };

    let mut problems = Vec::new();
    let mut config = RepoConfig::default();

    if let Some(section) = section(&root, "categories", &mut problems) {
        let toggles = &mut config.categories;
        for (key, slot) in [
            ("security", &mut toggles.security),
            ("quality", &mut toggles.quality),
            ("style", &mut toggles.style),
            ("performance", &mut toggles.performance),
            ("bestPractice", &mut toggles.best_practice),
        ] {
            match section.get(key) {
                None => {}
                Some(Value::Bool(value)) => *slot = *value,
                Some(_) => problems.push(inline_error(format!(
                    "categories.{key} must be true or false"
                ))),
            }
        }
    }

    if let Some(section) = section(&root, "qualityGate", &mut problems) {
        match section.get("blockOnCritical") {
            None => {}
            Some(Value::Bool(value)) => config.quality_gate.block_on_critical = *value,
            Some(_) => problems.push(inline_error(
                "qualityGate.blockOnCritical must be true or false",
            )),
        }
        match section.get("minScore") {
            None | Some(Value::Null) => {}
            Some(value) => match value.as_f64() {
                Some(score) if MIN_SCORE_RANGE.contains(&score) => {
                    config.quality_gate.min_score = Some(score);
                }
                _ => problems.push(inline_error(
                    "qualityGate.minScore must be a number between 0 and 100",
                )),
            },
        }
    }

    if let Some(section) = section(&root, "ignore", &mut problems) {
        config.ignore.paths = string_list(section.get("paths"), "ignore.paths", &mut problems);
    }

    if let Some(section) = section(&root, "rules", &mut problems) {
        config.rules.disable = string_list(section.get("disable"), "rules.disable", &mut problems);
        match section.get("severityOverrides") {
            None | Some(Value::Null) => {}
            Some(Value::Object(overrides)) => {
                for (key, value) in overrides {
                    match value.as_str().and_then(parse_override) {
                        Some(severity) => {
                            config.rules.severity_overrides.insert(key.clone(), severity);
                        }
                        None => problems.push(inline_error(format!(
                            "rules.severityOverrides.{key} must be one of CRITICAL, HIGH, MEDIUM, LOW, INFO"
                        ))),
                    }
                }
            }
            Some(_) => problems.push(inline_error("rules.severityOverrides must be a mapping")),
        }
    }

    if let Some(section) = section(&root, "duplication", &mut problems) {
        match section.get("minLines") {
            None | Some(Value::Null) => {}
            Some(value) => match value.as_u64() {
                Some(lines) if MIN_LINES_RANGE.contains(&lines) => {
                    config.duplication.min_lines = usize::try_from(lines).ok();
                }
                _ => problems.push(inline_error(
                    "duplication.minLines must be an integer between 3 and 20",
                )),
            },
        }
        config.duplication.ignore_patterns = string_list(
            section.get("ignorePatterns"),
            "duplication.ignorePatterns",
            &mut problems,
        );
    }

    config.ignored_paths = PathGlobs::compile(&config.ignore.paths, &mut problems);
    config.duplication_ignored =
        PathGlobs::compile(&config.duplication.ignore_patterns, &mut problems);

    Ok((config, problems))
}

/// Override values are exact uppercase severity names.
fn parse_override(value: &str) -> Option<Severity> {
    Severity::ALL
        .into_iter()
        .find(|severity| severity.label() == value)
}

fn section<'a>(
    root: &'a serde_json::Map<String, Value>,
    key: &str,
    problems: &mut Vec<NeatcommitError>,
) -> Option<&'a serde_json::Map<String, Value>> {
    match root.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            problems.push(inline_error(format!("{key} must be a mapping")));
            None
        }
    }
}

/// Keeps the string entries of a list, reporting everything else.
fn string_list(
    value: Option<&Value>,
    key: &str,
    problems: &mut Vec<NeatcommitError>,
) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let text = item.as_str().map(str::to_string);
                if text.is_none() {
                    problems.push(inline_error(format!("{key} entries must be strings")));
                }
                text
            })
            .collect(),
        Some(_) => {
            problems.push(inline_error(format!("{key} must be a list")));
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(rule_id: &str, title: &str, severity: Severity, category: Category) -> Finding {
        Finding {
            rule_id: rule_id.to_string(),
            title: title.to_string(),
            severity,
            category,
            ..Finding::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = RepoConfig::default();
        assert!(config.categories.security);
        assert!(config.categories.best_practice);
        assert!(config.quality_gate.block_on_critical);
        assert_eq!(config.quality_gate.min_score, None);
        assert_eq!(config.duplication.min_lines, None);
        assert!(!config.is_path_ignored("src/main.go"));
    }

    #[test]
    fn test_empty_and_invalid_yaml_give_defaults() {
        for raw in ["", "   \n", "[unclosed", "just a string"] {
            let config = parse_repo_config(raw);
            assert!(config.quality_gate.block_on_critical, "raw: {raw:?}");
            assert!(config.categories.quality, "raw: {raw:?}");
        }
    }

    #[test]
    fn test_parses_full_document() {
        let raw = r#"
categories:
  quality: false
  bestPractice: false
qualityGate:
  blockOnCritical: false
  minScore: 70
ignore:
  paths:
    - "vendor/**"
    - "*.min.js"
rules:
  disable: [Insecure-HTTP]
  severityOverrides:
    use-of-unsafepointer: LOW
    "Use of eval()": HIGH
duplication:
  minLines: 6
  ignorePatterns: ["**/*_test.go"]
"#;
        let config = parse_repo_config_strict(raw).unwrap();
        assert!(!config.categories.quality);
        assert!(!config.categories.best_practice);
        assert!(config.categories.security);
        assert!(!config.quality_gate.block_on_critical);
        assert_eq!(config.quality_gate.min_score, Some(70.0));
        assert_eq!(config.ignore.paths, vec!["vendor/**", "*.min.js"]);
        assert_eq!(config.rules.disable, vec!["Insecure-HTTP"]);
        assert_eq!(
            config.rules.severity_overrides.get("use-of-unsafepointer"),
            Some(&Severity::Low)
        );
        assert_eq!(config.duplication.min_lines, Some(6));
        assert!(config.is_duplication_ignored("pkg/db/db_test.go"));
        assert!(!config.is_duplication_ignored("pkg/db/db.go"));
    }

    #[test]
    fn test_out_of_range_values_fall_back_per_field() {
        let raw = r"
qualityGate:
  blockOnCritical: false
  minScore: 150
duplication:
  minLines: 2
categories:
  security: 'yes'
";
        let config = parse_repo_config(raw);
        assert!(!config.quality_gate.block_on_critical);
        assert_eq!(config.quality_gate.min_score, None);
        assert_eq!(config.duplication.min_lines, None);
        assert!(config.categories.security);

        assert!(parse_repo_config_strict(raw).is_err());
    }

    #[test]
    fn test_invalid_override_dropped() {
        let raw = r"
rules:
  severityOverrides:
    hardcoded-password: SEVERE
    insecure-http: low
    secret-jwt: MEDIUM
";
        let config = parse_repo_config(raw);
        assert_eq!(config.rules.severity_overrides.len(), 1);
        assert_eq!(
            config.rules.severity_overrides.get("secret-jwt"),
            Some(&Severity::Medium)
        );
    }

    #[test]
    fn test_strict_reports_yaml_error() {
        let err = parse_repo_config_strict("categories: [unclosed").unwrap_err();
        assert!(matches!(err, NeatcommitError::RepoConfig { .. }));
    }

    #[test]
    fn test_path_ignore_globs() {
        let config = parse_repo_config("ignore:\n  paths: [\"vendor/**\", \"*.min.js\", \"generated/\"]\n");
        assert!(config.is_path_ignored("vendor/lib/a.go"));
        assert!(config.is_path_ignored("./vendor/lib/a.go"));
        assert!(config.is_path_ignored("static/js/app.min.js"));
        assert!(config.is_path_ignored("app.min.js"));
        assert!(config.is_path_ignored("src/generated/model.ts"));
        assert!(!config.is_path_ignored("src/app.js"));
        assert!(!config.is_path_ignored("src/vendor.go"));
    }

    #[test]
    fn test_category_mapping() {
        let config = parse_repo_config("categories:\n  quality: false\n");
        assert!(config.is_category_enabled(Category::Security));
        assert!(!config.is_category_enabled(Category::Quality));
        assert!(!config.is_category_enabled(Category::Maintainability));
        assert!(config.is_category_enabled(Category::BestPractice));

        let issues = vec![
            finding("a", "A", Severity::High, Category::Security),
            finding("b", "B", Severity::Low, Category::Maintainability),
        ];
        let kept = config.filter_categories(issues);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].rule_id, "a");
    }

    #[test]
    fn test_apply_rules_disable_and_override() {
        let raw = r#"
rules:
  disable: [INSECURE-HTTP]
  severityOverrides:
    use-of-unsafepointer: LOW
    "Possible JWT in source": CRITICAL
"#;
        let config = parse_repo_config(raw);
        let issues = vec![
            finding("insecure-http", "Insecure HTTP Connection", Severity::Medium, Category::Security),
            finding("use-of-unsafepointer", "Use of unsafe.Pointer", Severity::Medium, Category::Security),
            finding("secret-jwt", "Possible JWT in source", Severity::High, Category::Security),
        ];

        let result = config.apply_rules(issues);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].severity, Severity::Low);
        assert_eq!(result[1].severity, Severity::Critical);
    }

    #[test]
    fn test_quality_gate() {
        let config = RepoConfig::default();
        let gate = config.quality_gate(1, 95.0);
        assert!(!gate.passed);
        assert!(gate.blocked_by_critical);
        assert_eq!(gate.reasons().len(), 1);
        assert!(config.quality_gate(0, 10.0).passed);

        let strict = parse_repo_config("qualityGate:\n  blockOnCritical: false\n  minScore: 80\n");
        assert!(strict.quality_gate(3, 85.0).passed);
        let gate = strict.quality_gate(0, 79.5);
        assert!(!gate.passed);
        assert!(gate.below_min_score);
        assert_eq!(gate.reasons(), vec!["**Minimum score** threshold not met."]);
    }

    #[test]
    fn test_critical_gate_ignores_min_score() {
        let config = parse_repo_config("qualityGate:\n  minScore: 100\n");
        assert!(config.critical_gate(0).passed);
        assert!(config.critical_gate(1).blocked_by_critical);

        let lenient = parse_repo_config("qualityGate:\n  blockOnCritical: false\n");
        assert!(lenient.critical_gate(5).passed);
    }

    #[test]
    fn test_load_repo_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_repo_config(dir.path()).unwrap();
        assert!(config.categories.quality);

        std::fs::write(
            dir.path().join(".neatcommit.yaml"),
            "categories:\n  quality: false\n",
        )
        .unwrap();
        let config = load_repo_config(dir.path()).unwrap();
        assert!(!config.categories.quality);
    }
}
