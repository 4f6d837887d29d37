// SPDX-License-Identifier: Apache-2.0

//! Integration tests for `SecurityScanner` using fixture files.
//!
//! These tests verify that the security scanner flags every annotated line of
//! the vulnerable fixtures with the stated severity and produces zero
//! findings for the safe fixtures.

use std::fmt::Write;

use neatcommit_core::security::scanner::SecurityScanner;
use neatcommit_core::security::types::{Finding, Severity};

const GO_FIXTURE: &str = include_str!("../../../tests/security_fixtures/vulnerable/go_example.go");
const PYTHON_FIXTURE: &str =
    include_str!("../../../tests/security_fixtures/vulnerable/python_example.py");
const JAVASCRIPT_FIXTURE: &str =
    include_str!("../../../tests/security_fixtures/vulnerable/javascript_example.js");
const JAVA_FIXTURE: &str =
    include_str!("../../../tests/security_fixtures/vulnerable/java_example.java");
const CSHARP_FIXTURE: &str =
    include_str!("../../../tests/security_fixtures/vulnerable/csharp_example.cs");
const RUBY_FIXTURE: &str =
    include_str!("../../../tests/security_fixtures/vulnerable/ruby_example.rb");
const SAFE_GO_FIXTURE: &str =
    include_str!("../../../tests/security_fixtures/safe/safe_patterns.go");
const SAFE_PYTHON_FIXTURE: &str =
    include_str!("../../../tests/security_fixtures/safe/safe_patterns.py");

/// Helper function to generate a unified diff format for testing.
///
/// Takes fixture content and a filename, returns a properly formatted diff
/// that can be passed to `SecurityScanner::scan_diff()`.
fn create_test_diff(content: &str, filename: &str) -> String {
    let mut diff_content = String::new();
    for line in content.lines() {
        let _ = writeln!(diff_content, "+{line}");
    }
    format!(
        r"diff --git a/{filename} b/{filename}
new file mode 100644
index 0000000..1111111
--- /dev/null
+++ b/{filename}
@@ -0,0 +1,{line_count} @@
{diff_content}",
        line_count = content.lines().count(),
    )
}

/// Severity annotations (`// CRITICAL: ...`) with the line range they cover:
/// the following lines up to the next blank line or annotation.
fn annotated_blocks(content: &str) -> Vec<(Severity, usize, usize)> {
    let lines: Vec<&str> = content.lines().collect();
    let mut blocks = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let Some(comment) = line.trim().strip_prefix("//") else {
            continue;
        };
        let Some((label, _)) = comment.trim().split_once(':') else {
            continue;
        };
        let severity = match label {
            "CRITICAL" => Severity::Critical,
            "HIGH" => Severity::High,
            "MEDIUM" => Severity::Medium,
            _ => continue,
        };

        let start = idx + 2;
        let mut end = start;
        while end <= lines.len() {
            let next = lines[end - 1].trim();
            if next.is_empty()
                || ["// CRITICAL", "// HIGH", "// MEDIUM"]
                    .iter()
                    .any(|marker| next.starts_with(marker))
            {
                break;
            }
            end += 1;
        }
        blocks.push((severity, start, end - 1));
    }

    blocks
}

fn rule_lines(findings: &[Finding], rule_id: &str) -> Vec<usize> {
    let mut lines: Vec<usize> = findings
        .iter()
        .filter(|f| f.rule_id == rule_id)
        .map(|f| f.line_number)
        .collect();
    lines.sort_unstable();
    lines
}

#[test]
fn test_go_fixture_annotations_are_flagged() {
    let scanner = SecurityScanner::new();
    let findings = scanner.scan_file(GO_FIXTURE, "go_example.go");

    let blocks = annotated_blocks(GO_FIXTURE);
    assert_eq!(blocks.len(), 5, "fixture annotations: {blocks:?}");

    for (severity, start, end) in blocks {
        assert!(
            findings
                .iter()
                .any(|f| f.severity == severity && (start..=end).contains(&f.line_number)),
            "Expected a {severity} finding in lines {start}..={end}. Findings: {findings:#?}"
        );
    }
}

#[test]
fn test_go_fixture_vulnerability_classes() {
    let scanner = SecurityScanner::new();
    let findings = scanner.scan_file(GO_FIXTURE, "go_example.go");

    let expect = |line: usize, rule_id: &str, severity: Severity, cwe: &str| {
        let finding = findings
            .iter()
            .find(|f| f.line_number == line && f.rule_id == rule_id)
            .unwrap_or_else(|| panic!("{rule_id} not reported on line {line}: {findings:#?}"));
        assert_eq!(finding.severity, severity, "{rule_id}");
        assert_eq!(finding.cwe.as_deref(), Some(cwe), "{rule_id}");
    };

    // Hardcoded secrets
    expect(12, "hardcoded-password", Severity::Critical, "CWE-798");
    expect(13, "hardcoded-api-key", Severity::Critical, "CWE-798");
    // SQL injection
    expect(17, "sql-string-concat", Severity::Critical, "CWE-89");
    expect(
        22,
        "potential-sql-injection---fmtsprintf",
        Severity::Critical,
        "CWE-89",
    );
    // Command injection
    expect(28, "go-exec-command-variable", Severity::High, "CWE-78");
    // Unsafe pointer
    expect(34, "use-of-unsafepointer", Severity::Medium, "CWE-20");

    // The `"unsafe"` import is not a use of unsafe.Pointer.
    assert!(!findings.iter().any(|f| f.line_number == 8));
}

#[test]
fn test_go_fixture_through_diff() {
    let scanner = SecurityScanner::new();
    let from_file = scanner.scan_file(GO_FIXTURE, "cmd/go_example.go");
    let from_diff = scanner.scan_diff(&create_test_diff(GO_FIXTURE, "cmd/go_example.go"));

    let key = |f: &Finding| (f.line_number, f.rule_id.clone());
    let mut file_keys: Vec<_> = from_file.iter().map(key).collect();
    let mut diff_keys: Vec<_> = from_diff.iter().map(key).collect();
    file_keys.sort();
    diff_keys.sort();
    assert_eq!(file_keys, diff_keys);
    assert!(from_diff.iter().all(|f| f.file_path == "cmd/go_example.go"));
}

#[test]
fn test_python_fixture() {
    let findings = SecurityScanner::new().scan_file(PYTHON_FIXTURE, "python_example.py");

    assert_eq!(rule_lines(&findings, "hardcoded-password"), [8]);
    assert_eq!(rule_lines(&findings, "hardcoded-api-key"), [9]);
    assert!(rule_lines(&findings, "command-injection---ossystem").contains(&22));
    assert_eq!(rule_lines(&findings, "unsafe-deserialization---pickle"), [29]);
    assert_eq!(
        rule_lines(&findings, "insecure-random-number-generation"),
        [33]
    );
    assert!(rule_lines(&findings, "use-of-eval").contains(&38));
}

#[test]
fn test_javascript_fixture() {
    let findings = SecurityScanner::new().scan_file(JAVASCRIPT_FIXTURE, "app.js");

    assert_eq!(rule_lines(&findings, "hardcoded-password"), [4]);
    assert!(rule_lines(&findings, "potential-xss---dangerouslysetinnerhtml").contains(&16));
    assert_eq!(
        rule_lines(&findings, "insecure-random-number-generation"),
        [19]
    );
    assert!(rule_lines(&findings, "use-of-eval").contains(&22));
    assert_eq!(rule_lines(&findings, "insecure-http"), [28]);
}

#[test]
fn test_java_fixture() {
    let findings = SecurityScanner::new().scan_file(JAVA_FIXTURE, "UserService.java");

    assert_eq!(rule_lines(&findings, "hardcoded-password"), [8]);
    assert_eq!(rule_lines(&findings, "sql-string-concat"), [12, 21]);
    assert_eq!(rule_lines(&findings, "potential-xss---direct-output"), [28]);
    assert_eq!(rule_lines(&findings, "unsafe-deserialization"), [39, 40]);
}

#[test]
fn test_csharp_fixture() {
    let findings = SecurityScanner::new().scan_file(CSHARP_FIXTURE, "UserService.cs");

    assert_eq!(rule_lines(&findings, "sql-string-concat"), [16, 29]);
    assert_eq!(
        rule_lines(&findings, "potential-sql-injection---stringformat"),
        [20]
    );
    assert_eq!(rule_lines(&findings, "potential-xss---responsewrite"), [37]);
}

#[test]
fn test_ruby_fixture() {
    let findings = SecurityScanner::new().scan_file(RUBY_FIXTURE, "user.rb");

    assert_eq!(
        rule_lines(&findings, "potential-sql-injection---string-interpolation"),
        [9]
    );
    assert_eq!(rule_lines(&findings, "potential-xss---erb-template"), [16]);
    assert_eq!(rule_lines(&findings, "command-injection---system"), [19]);
    assert_eq!(rule_lines(&findings, "command-injection---backticks"), [22]);
}

#[test]
fn test_language_specific_rules_stay_in_their_language() {
    // Ruby interpolation rules must not fire on the same text in a Go file.
    let findings = SecurityScanner::new().scan_file(RUBY_FIXTURE, "user.go");
    assert!(rule_lines(&findings, "command-injection---backticks").is_empty());
    assert_eq!(rule_lines(&findings, "hardcoded-password"), [4]);
}

#[test]
fn test_safe_patterns_no_findings() {
    let scanner = SecurityScanner::new();

    for (content, path) in [
        (SAFE_GO_FIXTURE, "safe.go"),
        (SAFE_PYTHON_FIXTURE, "safe.py"),
    ] {
        let findings = scanner.scan_file(content, path);
        assert!(
            findings.is_empty(),
            "Safe fixture {path} should produce zero findings. Found: {findings:#?}"
        );

        let findings = scanner.scan_diff(&create_test_diff(content, path));
        assert!(findings.is_empty(), "{path} via diff: {findings:#?}");
    }
}

#[test]
fn test_annotated_blocks_helper() {
    let blocks = annotated_blocks("// HIGH: x\na\nb\n\n// MEDIUM: y\nc\n");
    assert_eq!(
        blocks,
        vec![(Severity::High, 2, 3), (Severity::Medium, 6, 6)]
    );
}
