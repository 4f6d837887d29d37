// SPDX-License-Identifier: Apache-2.0

//! Security pattern engine with regex-based vulnerability detection.
//!
//! The rule table is embedded at compile time and compiled once per process.
//! Each rule is either universal or restricted to a list of languages.

use std::sync::LazyLock;

use regex::Regex;

use crate::language::Language;
use crate::security::types::{Finding, PatternDefinition};

/// Embedded pattern database JSON.
const PATTERNS_JSON: &str = include_str!("patterns.json");

/// Compiled pattern engine (initialized once on first use).
static PATTERN_ENGINE: LazyLock<PatternEngine> = LazyLock::new(|| {
    PatternEngine::from_embedded_json()
        .expect("Failed to load embedded security patterns - patterns.json is malformed")
});

/// Pattern engine for security scanning.
#[derive(Debug)]
pub struct PatternEngine {
    patterns: Vec<CompiledPattern>,
}

/// A pattern with pre-compiled regexes.
#[derive(Debug)]
struct CompiledPattern {
    definition: PatternDefinition,
    rule_id: String,
    regex: Regex,
    /// Anchored at the end of the main match.
    not_followed_by: Option<Regex>,
}

impl CompiledPattern {
    fn applies_to(&self, language: Language) -> bool {
        self.definition.is_universal()
            || self
                .definition
                .languages
                .iter()
                .any(|lang| lang == language.as_str())
    }

    fn matches_line(&self, line: &str) -> bool {
        match &self.not_followed_by {
            None => self.regex.is_match(line),
            Some(guard) => self
                .regex
                .find_iter(line)
                .any(|mat| !guard.is_match(&line[mat.end()..])),
        }
    }
}

impl PatternEngine {
    /// Creates a pattern engine from the embedded JSON patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or regex compilation fails.
    pub fn from_embedded_json() -> anyhow::Result<Self> {
        let definitions: Vec<PatternDefinition> = serde_json::from_str(PATTERNS_JSON)?;
        Self::from_definitions(definitions)
    }

    /// Creates a pattern engine from explicit definitions.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex fails to compile.
    pub fn from_definitions(definitions: Vec<PatternDefinition>) -> anyhow::Result<Self> {
        let mut patterns = Vec::with_capacity(definitions.len());

        for def in definitions {
            let regex = Regex::new(&def.pattern)?;
            let not_followed_by = def
                .not_followed_by
                .as_deref()
                .map(|guard| Regex::new(&format!("^(?:{guard})")))
                .transpose()?;
            patterns.push(CompiledPattern {
                rule_id: def.rule_id(),
                definition: def,
                regex,
                not_followed_by,
            });
        }

        Ok(Self { patterns })
    }

    /// Gets the global pattern engine instance.
    #[must_use]
    pub fn global() -> &'static Self {
        &PATTERN_ENGINE
    }

    /// Scans text content for security vulnerabilities.
    ///
    /// Every line is checked against the universal rules plus the rules of
    /// `language`. A rule reports at most one finding per line.
    #[must_use]
    pub fn scan(&self, content: &str, file_path: &str, language: Language) -> Vec<Finding> {
        let applicable: Vec<&CompiledPattern> = self
            .patterns
            .iter()
            .filter(|p| p.applies_to(language))
            .collect();
        let mut findings = Vec::new();

        for (idx, line) in content.split('\n').enumerate() {
            for compiled in &applicable {
                if !compiled.matches_line(line) {
                    continue;
                }

                tracing::debug!(
                    rule_id = %compiled.rule_id,
                    file = %file_path,
                    line = idx + 1,
                    "Security pattern matched"
                );

                let def = &compiled.definition;
                findings.push(Finding {
                    rule_id: compiled.rule_id.clone(),
                    title: def.name.clone(),
                    description: def.description.clone(),
                    severity: def.severity,
                    category: def.category,
                    file_path: file_path.to_string(),
                    line_number: idx + 1,
                    snippet: line.trim().to_string(),
                    suggested_fix: def.suggested_fix.clone(),
                    cwe: def.cwe.clone(),
                    owasp: def.owasp.clone(),
                });
            }
        }

        findings
    }

    /// Rules that apply to `language` (universal ones included).
    #[must_use]
    pub fn patterns_for(&self, language: Language) -> Vec<&PatternDefinition> {
        self.patterns
            .iter()
            .filter(|p| p.applies_to(language))
            .map(|p| &p.definition)
            .collect()
    }

    /// All rules in table order.
    #[must_use]
    pub fn rules(&self) -> Vec<&PatternDefinition> {
        self.patterns.iter().map(|p| &p.definition).collect()
    }

    /// Looks up the first rule with the given id.
    #[must_use]
    pub fn find_rule(&self, rule_id: &str) -> Option<&PatternDefinition> {
        self.patterns
            .iter()
            .find(|p| p.rule_id == rule_id)
            .map(|p| &p.definition)
    }

    /// Returns the number of loaded patterns.
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::types::Severity;

    #[test]
    fn test_pattern_engine_loads() {
        let engine = PatternEngine::from_embedded_json().unwrap();
        assert!(
            engine.pattern_count() >= 50,
            "Should have at least 50 patterns"
        );
    }

    #[test]
    fn test_global_engine() {
        let engine = PatternEngine::global();
        assert_eq!(
            engine.pattern_count(),
            PatternEngine::from_embedded_json().unwrap().pattern_count()
        );
    }

    #[test]
    fn test_hardcoded_api_key_detection() {
        let engine = PatternEngine::global();
        let code = r#"
            var apiKey = "sk-1234567890abcdef"
        "#;

        let findings = engine.scan(code, "main.go", Language::Go);
        let api_key_finding = findings
            .iter()
            .find(|f| f.rule_id == "hardcoded-api-key")
            .expect("Should detect API key");

        assert_eq!(api_key_finding.severity, Severity::Critical);
        assert_eq!(api_key_finding.cwe, Some("CWE-798".to_string()));
        assert_eq!(api_key_finding.line_number, 2);
        assert_eq!(api_key_finding.snippet, "var apiKey = \"sk-1234567890abcdef\"");
    }

    #[test]
    fn test_go_sql_injection_detection() {
        let engine = PatternEngine::global();
        let code = r#"query := "SELECT * FROM users WHERE id = " + userID
query2 := fmt.Sprintf("SELECT * FROM users WHERE name = '%s'", name)"#;

        let findings = engine.scan(code, "db.go", Language::Go);
        assert!(
            findings
                .iter()
                .any(|f| f.rule_id == "sql-string-concat" && f.line_number == 1)
        );
        assert!(findings.iter().any(|f| {
            f.rule_id == "potential-sql-injection---fmtsprintf" && f.line_number == 2
        }));
        assert!(findings.iter().all(|f| f.severity == Severity::Critical));
    }

    #[test]
    fn test_insecure_http_skips_localhost() {
        let engine = PatternEngine::global();

        let local = engine.scan("url = \"http://localhost:3000\"", "a.js", Language::Javascript);
        assert!(local.iter().all(|f| f.rule_id != "insecure-http"));

        let loopback = engine.scan("fetch('http://127.0.0.1/')", "a.js", Language::Javascript);
        assert!(loopback.iter().all(|f| f.rule_id != "insecure-http"));

        let remote = engine.scan("fetch('http://example.com')", "a.js", Language::Javascript);
        assert!(remote.iter().any(|f| f.rule_id == "insecure-http"));

        let mixed = engine.scan(
            "// http://localhost or http://example.com",
            "a.js",
            Language::Javascript,
        );
        assert!(mixed.iter().any(|f| f.rule_id == "insecure-http"));
    }

    #[test]
    fn test_weak_crypto_detection() {
        let engine = PatternEngine::global();
        let code = r"
            let hash = md5(password);
            let digest = SHA1(data);
        ";

        let findings = engine.scan(code, "crypto.rs", Language::Rust);
        assert_eq!(findings.len(), 2, "Should detect both MD5 and SHA1");

        assert!(findings.iter().any(|f| f.rule_id == "weak-hash-algorithm-md5"));
        assert!(findings.iter().any(|f| f.rule_id == "weak-hash-sha1"));
    }

    #[test]
    fn test_language_filtering() {
        let engine = PatternEngine::global();
        let js_code = "element.innerHTML = `<div>${userInput}</div>`;";

        let js_findings = engine.scan(js_code, "app.js", Language::Javascript);
        assert!(
            js_findings
                .iter()
                .any(|f| f.title == "Potential XSS - innerHTML")
        );

        let py_findings = engine.scan(js_code, "app.py", Language::Python);
        assert!(py_findings.is_empty(), "JS rules must not apply to Python");
    }

    #[test]
    fn test_case_sensitive_rules() {
        let engine = PatternEngine::global();
        let findings = engine.scan("x = math.RANDOM()", "a.js", Language::Javascript);
        assert!(findings.is_empty());

        let findings = engine.scan("x = Math.random()", "a.js", Language::Javascript);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[test]
    fn test_one_finding_per_line_and_rule() {
        let engine = PatternEngine::global();
        let code = r#"password = "a"; password = "b""#;
        let findings = engine.scan(code, "x.py", Language::Python);
        assert_eq!(
            findings
                .iter()
                .filter(|f| f.rule_id == "hardcoded-password")
                .count(),
            1
        );
    }

    #[test]
    fn test_sql_missing_where() {
        let engine = PatternEngine::global();
        let findings = engine.scan(
            "DELETE FROM users WHERE id = 1;\nDELETE FROM sessions ;",
            "cleanup.sql",
            Language::Sql,
        );
        let lines: Vec<usize> = findings
            .iter()
            .filter(|f| f.title == "Missing WHERE Clause in DELETE")
            .map(|f| f.line_number)
            .collect();
        assert_eq!(lines, vec![2]);
    }

    #[test]
    fn test_no_false_positives_on_safe_code() {
        let engine = PatternEngine::global();
        let safe_code = r#"
            // Safe code examples
            let config = load_config();
            let result = query_with_params("SELECT * FROM users WHERE id = ?", &[id]);
            let hash = sha256(data);
        "#;

        let findings = engine.scan(safe_code, "safe.rs", Language::Rust);
        assert!(
            findings.is_empty(),
            "Should not have false positives on safe code"
        );
    }

    #[test]
    fn test_unknown_language_gets_universal_rules_only() {
        let engine = PatternEngine::global();
        let universal = engine.patterns_for(Language::Unknown);
        assert!(universal.iter().all(|p| p.is_universal()));
        assert!(engine.patterns_for(Language::Go).len() > universal.len());
    }

    #[test]
    fn test_find_rule() {
        let engine = PatternEngine::global();
        let rule = engine.find_rule("use-of-unsafepointer").unwrap();
        assert_eq!(rule.cwe.as_deref(), Some("CWE-20"));
        assert!(engine.find_rule("no-such-rule").is_none());
    }

    #[test]
    fn test_line_number_accuracy() {
        let engine = PatternEngine::global();
        let code = "line 1\nline 2\napi_key = \"sk-1234567890abcdefghijklmnopqrstuvwxyz\"\nline 4";

        let findings = engine.scan(code, "test.rs", Language::Rust);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].line_number, 3,
            "Should report correct line number"
        );
    }
}
