// SPDX-License-Identifier: Apache-2.0

//! Infrastructure-as-code checks for Terraform, Dockerfiles and Kubernetes
//! manifests.
//!
//! Every issue produced here is filed under [`Category::Security`].

use std::sync::LazyLock;

use regex::Regex;

use crate::issue::{Issue, IssueSource};
use crate::language::file_name;
use crate::security::types::{Category, Severity};

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static IaC pattern")
}

static TF_SECRET: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?i)(?:password|secret)\s*=\s*["'][^"']+["']"#));
static TF_PUBLIC: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)allow_public_access\s*=\s*true"));

static DOCKER_USER: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)^USER\s+"));
static DOCKER_RUN: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)^RUN\s"));
static DOCKER_EXPOSE: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)^EXPOSE\s+(\d+)"));
static DOCKER_CURL_SH: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)RUN\s+.*\bcurl\s+.*\|\s*sh\b"));

static K8S_DEFAULT_NS: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?im)namespace:\s*["']?default"#));
static K8S_DEFAULT_NS_LINE: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?i)namespace:\s*(?:default|["']default["'])"#));
static K8S_WORKLOAD: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)kind:\s*(?:Deployment|StatefulSet)"));
static K8S_LIMITS: LazyLock<Regex> = LazyLock::new(|| regex(r"(?s)resources:.*?limits:"));

fn issue(severity: Severity, title: &str, description: &str, line: usize, fix: &str) -> Issue {
    Issue::new(IssueSource::Iac, severity, Category::Security, title, description)
        .at_line(line)
        .with_fix(fix)
}

fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Which IaC checker handles a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IacKind {
    /// `.tf` files.
    Terraform,
    /// `Dockerfile` and `Dockerfile.*`.
    Dockerfile,
    /// YAML under a `k8s`, `manifests` or `kubernetes` path.
    Kubernetes,
}

/// Classifies `path`, or `None` when it is not an IaC file.
#[must_use]
pub fn iac_kind(path: &str) -> Option<IacKind> {
    let name = file_name(path);
    let lower = path.to_ascii_lowercase();

    if path.ends_with(".tf") {
        Some(IacKind::Terraform)
    } else if name == "Dockerfile" || name.starts_with("Dockerfile.") {
        Some(IacKind::Dockerfile)
    } else if (lower.ends_with(".yaml") || lower.ends_with(".yml"))
        && ["k8s", "manifests", "kubernetes"]
            .iter()
            .any(|marker| path.contains(marker))
    {
        Some(IacKind::Kubernetes)
    } else {
        None
    }
}

/// Whether [`analyze_iac_file`] has a checker for `path`.
#[must_use]
pub fn is_iac_file(path: &str) -> bool {
    iac_kind(path).is_some()
}

/// Hardcoded secrets and public access flags in Terraform.
#[must_use]
pub fn analyze_terraform(content: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (index, line) in split_lines(content).enumerate() {
        let line_number = index + 1;
        if TF_SECRET.is_match(line) {
            issues.push(issue(
                Severity::Critical,
                "Hardcoded secret in Terraform",
                "Sensitive value should not be in source; use variable or vault",
                line_number,
                "Use var.secret_name or a secrets backend (e.g. Vault, AWS Secrets Manager)",
            ));
        }
        if TF_PUBLIC.is_match(line) {
            issues.push(issue(
                Severity::High,
                "Public access enabled",
                "Resource may be exposed to the internet",
                line_number,
                "Set to false or restrict with CIDR/list",
            ));
        }
    }

    issues
}

/// Root user, SSH exposure and `curl | sh` in a Dockerfile.
#[must_use]
pub fn analyze_dockerfile(content: &str) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut has_user = false;
    let mut has_run = false;

    for (index, line) in split_lines(content).enumerate() {
        let line_number = index + 1;
        has_user |= DOCKER_USER.is_match(line);
        has_run |= DOCKER_RUN.is_match(line);

        if DOCKER_EXPOSE
            .captures(line)
            .is_some_and(|caps| &caps[1] == "22")
        {
            issues.push(issue(
                Severity::Medium,
                "SSH port exposed",
                "Exposing 22 can be a risk; prefer exec",
                line_number,
                "Avoid EXPOSE 22; use docker exec instead",
            ));
        }
        if DOCKER_CURL_SH.is_match(line) {
            issues.push(issue(
                Severity::High,
                "Unsafe RUN with pipe to shell",
                "Piping download to sh is unsafe",
                line_number,
                "Download to file, verify, then run",
            ));
        }
    }

    if has_run && !has_user {
        issues.push(issue(
            Severity::Medium,
            "Container may run as root",
            "No USER directive; default is root",
            1,
            "Add USER nonroot (or similar) after installing dependencies",
        ));
    }

    issues
}

/// Default namespace and missing resource limits in a Kubernetes manifest.
///
/// Content without both `apiVersion:` and `kind:` is not a manifest and
/// yields nothing.
#[must_use]
pub fn analyze_kubernetes(content: &str) -> Vec<Issue> {
    let mut issues = Vec::new();
    if !(content.contains("apiVersion:") && content.contains("kind:")) {
        return issues;
    }

    let first_line_matching = |re: &Regex| {
        split_lines(content)
            .position(|line| re.is_match(line))
            .map_or(1, |index| index + 1)
    };

    if K8S_DEFAULT_NS.is_match(content) {
        issues.push(issue(
            Severity::Low,
            "Using default namespace",
            "Prefer a dedicated namespace for clarity and RBAC",
            first_line_matching(&K8S_DEFAULT_NS_LINE),
            "Set namespace to a dedicated value (e.g. app-name)",
        ));
    }

    if K8S_WORKLOAD.is_match(content) && !K8S_LIMITS.is_match(content) {
        issues.push(issue(
            Severity::Medium,
            "Missing resource limits",
            "Containers should have limits to avoid resource exhaustion",
            first_line_matching(&K8S_WORKLOAD),
            "Add resources.limits (memory, cpu) to container spec",
        ));
    }

    issues
}

/// Runs the checker matching `path`; other files yield nothing.
#[must_use]
pub fn analyze_iac_file(content: &str, path: &str) -> Vec<Issue> {
    let issues = match iac_kind(path) {
        Some(IacKind::Terraform) => analyze_terraform(content),
        Some(IacKind::Dockerfile) => analyze_dockerfile(content),
        Some(IacKind::Kubernetes) => analyze_kubernetes(content),
        None => return Vec::new(),
    };
    tracing::debug!(file = path, issues = issues.len(), "IaC analysis completed");
    issues
}
