// SPDX-License-Identifier: Apache-2.0

//! End-to-end analysis of the fixture tree: IaC checks, scoring, quality
//! gates, review comments and SARIF export.

use neatcommit_core::repo_config::parse_repo_config;
use neatcommit_core::{
    AnalysisCache, AnalysisConfig, Analyzer, Category, IssueSource, SarifReport, Severity,
    SourceFile, format_file_comment, format_summary_comment,
};

const GO_FIXTURE: &str = include_str!("../../../tests/security_fixtures/vulnerable/go_example.go");
const SAFE_GO_FIXTURE: &str =
    include_str!("../../../tests/security_fixtures/safe/safe_patterns.go");
const TERRAFORM_FIXTURE: &str = include_str!("../../../tests/security_fixtures/iac/main.tf");
const DOCKERFILE_FIXTURE: &str = include_str!("../../../tests/security_fixtures/iac/Dockerfile");
const K8S_FIXTURE: &str =
    include_str!("../../../tests/security_fixtures/iac/k8s/deployment.yaml");

fn issue_titles(analyzer: &Analyzer, path: &str, content: &str) -> Vec<(String, Option<usize>)> {
    analyzer
        .analyze_file(path, content)
        .issues
        .into_iter()
        .map(|issue| (issue.title, issue.line))
        .collect()
}

#[test]
fn test_terraform_fixture() {
    let analysis = Analyzer::default().analyze_file("infra/main.tf", TERRAFORM_FIXTURE);

    assert!(analysis.is_supported);
    let iac: Vec<_> = analysis
        .issues
        .iter()
        .filter(|issue| issue.source == IssueSource::Iac)
        .map(|issue| (issue.title.as_str(), issue.line, issue.severity))
        .collect();
    assert_eq!(
        iac,
        [
            ("Hardcoded secret in Terraform", Some(4), Severity::Critical),
            ("Public access enabled", Some(5), Severity::High),
        ]
    );

    // The universal password pattern fires on the same line.
    assert!(
        analysis
            .issues
            .iter()
            .any(|issue| issue.rule_id.as_deref() == Some("hardcoded-password")
                && issue.line == Some(4))
    );
    // Two criticals and one high.
    assert_eq!(analysis.score, 50);
}

#[test]
fn test_dockerfile_fixture() {
    let analyzer = Analyzer::default();
    let mut titles = issue_titles(&analyzer, "Dockerfile", DOCKERFILE_FIXTURE);
    titles.sort();

    assert_eq!(
        titles,
        [
            ("Container may run as root".to_string(), Some(1)),
            ("SSH port exposed".to_string(), Some(4)),
            ("Unsafe RUN with pipe to shell".to_string(), Some(3)),
        ]
    );
    assert_eq!(
        analyzer.analyze_file("Dockerfile", DOCKERFILE_FIXTURE).score,
        80
    );
}

#[test]
fn test_kubernetes_fixture() {
    let analyzer = Analyzer::default();
    let analysis = analyzer.analyze_file("k8s/deployment.yaml", K8S_FIXTURE);

    let issues: Vec<_> = analysis
        .issues
        .iter()
        .map(|issue| (issue.title.as_str(), issue.line, issue.severity))
        .collect();
    assert_eq!(
        issues,
        [
            ("Missing resource limits", Some(2), Severity::Medium),
            ("Using default namespace", Some(5), Severity::Low),
        ]
    );
    assert!(
        analysis
            .issues
            .iter()
            .all(|issue| issue.category == Category::Security)
    );

    // Outside a manifest directory the same YAML is not checked.
    assert!(
        analyzer
            .analyze_file("config/deployment.yaml", K8S_FIXTURE)
            .issues
            .is_empty()
    );
}

#[test]
fn test_multi_file_report() {
    let files = vec![
        SourceFile::new("cmd/go_example.go", GO_FIXTURE),
        SourceFile::new("cmd/safe.go", SAFE_GO_FIXTURE),
        SourceFile::new("README.md", "# Service\n\npassword = \"not code\"\n"),
    ];
    let report = Analyzer::default().analyze_files(&files);

    assert_eq!(report.total_files, 3);
    assert_eq!(report.analyzed_files, 2);
    assert_eq!(
        report
            .files
            .iter()
            .map(|file| file.path.as_str())
            .collect::<Vec<_>>(),
        ["cmd/go_example.go", "cmd/safe.go", "README.md"]
    );

    let vulnerable = &report.files[0];
    assert_eq!(vulnerable.score, 5);
    assert!(vulnerable.summary.contains("4 CRITICAL security issues. 1 HIGH security issues"));
    assert_eq!(report.files[1].score, 100);
    assert!(report.files[2].issues.is_empty());

    assert_eq!(report.counts.critical, 4);
    assert!((report.avg_score - 52.5).abs() < f64::EPSILON);
    assert!(!report.quality_gate.passed);
    assert!(report.quality_gate.blocked_by_critical);
}

#[test]
fn test_repo_config_shapes_report() {
    let config = parse_repo_config(
        r#"
categories:
  security: false
qualityGate:
  minScore: 90
ignore:
  paths: ["vendor/**"]
"#,
    );
    let analyzer = Analyzer::new(config, AnalysisConfig::default());
    let report = analyzer.analyze_files(&[
        SourceFile::new("cmd/go_example.go", GO_FIXTURE),
        SourceFile::new("vendor/lib/go_example.go", GO_FIXTURE),
    ]);

    assert_eq!(report.total_files, 1);
    assert!(
        report
            .issues()
            .all(|(_, issue)| issue.category != Category::Security)
    );
    assert_eq!(report.files[0].score, 100);
    assert!(report.quality_gate.passed);
}

#[test]
fn test_min_score_gate() {
    let config = parse_repo_config("qualityGate:\n  blockOnCritical: false\n  minScore: 60\n");
    let report = Analyzer::new(config, AnalysisConfig::default())
        .analyze_files(&[SourceFile::new("Dockerfile", DOCKERFILE_FIXTURE)]);

    assert!((report.avg_score - 80.0).abs() < f64::EPSILON);
    assert!(report.quality_gate.passed);

    let config = parse_repo_config("qualityGate:\n  blockOnCritical: false\n  minScore: 85\n");
    let report = Analyzer::new(config, AnalysisConfig::default())
        .analyze_files(&[SourceFile::new("Dockerfile", DOCKERFILE_FIXTURE)]);
    assert!(!report.quality_gate.passed);
    assert!(report.quality_gate.below_min_score);
    assert!(!report.quality_gate.blocked_by_critical);
}

#[test]
fn test_summary_and_file_comments() {
    let report = Analyzer::default().analyze_files(&[
        SourceFile::new("cmd/go_example.go", GO_FIXTURE),
        SourceFile::new("infra/main.tf", TERRAFORM_FIXTURE),
    ]);

    let summary = format_summary_comment(&report, Some(42));
    assert!(summary.starts_with("## 🔍 Code Analysis Results for PR #42"));
    assert!(summary.contains("### ❌ Quality gate failed"));
    assert!(summary.contains("- **Files Analyzed:** 2/2"));
    assert!(summary.contains("File: `infra/main.tf` (line 4)"));

    let file = &report.files[1];
    let comment = format_file_comment(&file.path, &file.issues);
    assert!(comment.contains("Hardcoded secret in Terraform"));
    assert!(comment.contains("Public access enabled"));
}

#[test]
fn test_sarif_export_of_report() {
    let report = Analyzer::default().analyze_files(&[
        SourceFile::new("cmd/go_example.go", GO_FIXTURE),
        SourceFile::new("Dockerfile", DOCKERFILE_FIXTURE),
    ]);
    let sarif = SarifReport::from(&report);

    let run = &sarif.runs[0];
    assert_eq!(run.tool.driver.name, "neatcommit");
    assert_eq!(run.results.len(), report.counts.total());

    let mut rule_ids: Vec<&str> = run.tool.driver.rules.iter().map(|r| r.id.as_str()).collect();
    let before = rule_ids.len();
    rule_ids.dedup();
    assert_eq!(rule_ids.len(), before, "rules are listed once each");

    let root = run
        .results
        .iter()
        .find(|r| r.rule_id == "container-may-run-as-root")
        .expect("Dockerfile root user result");
    let location = &root.locations[0].physical_location;
    assert_eq!(location.artifact_location.uri, "Dockerfile");
    assert_eq!(location.region.start_line, 1);

    let json = serde_json::to_value(&sarif).unwrap();
    assert_eq!(json["version"], "2.1.0");
    assert!(json["runs"][0]["results"][0]["ruleId"].is_string());
}

#[test]
fn test_diff_report_gate_ignores_score() {
    let diff = "diff --git a/Dockerfile b/Dockerfile\n--- a/Dockerfile\n+++ b/Dockerfile\n@@ -1,1 +1,2 @@\n FROM alpine\n+ENV API_URL=\"http://internal.example.com\"\n";
    let report = Analyzer::default().analyze_diff(diff);

    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].rule_id, "insecure-http");
    assert_eq!(report.findings[0].line_number, 2);
    assert!(report.quality_gate.passed);
}

#[test]
fn test_cache_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = Analyzer::default().with_cache(AnalysisCache::new(dir.path(), 24));

    let first = analyzer.analyze_file("cmd/go_example.go", GO_FIXTURE);
    let second = analyzer.analyze_file("cmd/go_example.go", GO_FIXTURE);
    assert_eq!(first, second);
    assert!(
        std::fs::read_dir(dir.path()).unwrap().next().is_some(),
        "cache entry written"
    );

    // Different settings never share entries.
    let strict = AnalysisConfig {
        max_params: 0,
        ..AnalysisConfig::default()
    };
    let other = Analyzer::new(Default::default(), strict)
        .with_cache(AnalysisCache::new(dir.path(), 24))
        .analyze_file("cmd/go_example.go", GO_FIXTURE);
    assert!(other.issues.len() > first.issues.len());
}
