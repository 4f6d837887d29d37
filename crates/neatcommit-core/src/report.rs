// SPDX-License-Identifier: Apache-2.0

//! Markdown review comments.
//!
//! Formats analysis results as the summary comment of a pull request, inline
//! comments (optionally carrying a GitHub `suggestion` block) and per-file
//! comments.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::analysis::AnalysisReport;
use crate::issue::Issue;
use crate::language::Language;
use crate::security::types::Severity;

/// Critical and high issues listed in the summary comment.
pub const MAX_SUMMARY_ISSUES: usize = 10;

static HTTP_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)http://").expect("static pattern"));
static INSECURE_HTTP_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Insecure HTTP Connection").expect("static pattern"));
static CODE_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[=(\[;{}]").expect("static pattern"));
static CODE_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[\sA-Za-z0-9_.'"`,:\-><+*&|]+\s*[;)]?\s*$"#).expect("static pattern")
});

/// Emoji badge for a severity, e.g. `🔴 **CRITICAL**`.
#[must_use]
pub fn severity_badge(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴 **CRITICAL**",
        Severity::High => "🟠 **HIGH**",
        Severity::Medium => "🟡 **MEDIUM**",
        Severity::Low => "🟢 **LOW**",
        Severity::Info => "ℹ️ **INFO**",
    }
}

/// Traffic-light emoji for a 0..=100 score.
#[must_use]
pub fn score_emoji(score: f64) -> &'static str {
    if score >= 90.0 {
        "🟢"
    } else if score >= 70.0 {
        "🟡"
    } else if score >= 50.0 {
        "🟠"
    } else {
        "🔴"
    }
}

/// Summary comment for a whole report.
#[must_use]
pub fn format_summary_comment(report: &AnalysisReport, pr_number: Option<u64>) -> String {
    let counts = &report.counts;
    let mut comment = String::from("## 🔍 Code Analysis Results");
    if let Some(pr) = pr_number {
        let _ = write!(comment, " for PR #{pr}");
    }
    comment.push_str("\n\n");

    if !report.quality_gate.passed {
        comment.push_str("### ❌ Quality gate failed\n\n");
        for reason in report.quality_gate.reasons() {
            let _ = writeln!(comment, "- {reason}");
        }
        comment.push('\n');
    }

    let _ = write!(
        comment,
        "{} **Security Score: {}/100**\n\n",
        score_emoji(report.avg_score),
        report.avg_score.round()
    );

    comment.push_str("### 📊 Summary\n\n");
    let _ = writeln!(
        comment,
        "- **Files Analyzed:** {}/{}",
        report.analyzed_files, report.total_files
    );
    let _ = writeln!(comment, "- **Total Issues:** {}", counts.total());
    let _ = write!(
        comment,
        "- **Critical:** {} | **High:** {} | **Medium:** {} | **Low:** {}\n\n",
        counts.critical, counts.high, counts.medium, counts.low
    );

    let urgent = counts.critical + counts.high;
    if urgent > 0 {
        comment.push_str("### ⚠️ Critical & High Priority Issues\n\n");

        let listed = report
            .issues()
            .filter(|(_, issue)| issue.severity <= Severity::High)
            .take(MAX_SUMMARY_ISSUES);
        let mut shown = 0;
        for (index, (path, issue)) in listed.enumerate() {
            let _ = writeln!(
                comment,
                "{}. {} **{}**",
                index + 1,
                severity_badge(issue.severity),
                issue.title
            );
            let location = issue
                .line
                .map(|line| format!(" (line {line})"))
                .unwrap_or_default();
            let _ = writeln!(comment, "   - File: `{path}`{location}");
            let _ = writeln!(comment, "   - {}", issue.description);
            if let Some(fix) = &issue.suggested_fix {
                let _ = writeln!(comment, "   - 💡 **Fix:** {fix}");
            }
            comment.push('\n');
            shown += 1;
        }

        if shown < urgent {
            let _ = write!(
                comment,
                "*... and {} more critical/high issues*\n\n",
                urgent - shown
            );
        }
    }

    if counts.total() == 0 {
        comment.push_str("### ✅ No Issues Found\n\n");
        comment.push_str("Great job! No security or quality issues detected.\n\n");
    }

    comment.push_str("---\n\n");
    comment.push_str("*This analysis was performed automatically by NeatCommit Code Review*\n");
    comment
}

/// One-line replacement for `line` that fixes `issue`, when known.
///
/// Insecure HTTP URLs are upgraded to HTTPS; other issues have none.
#[must_use]
pub fn replacement_line_for(issue: &Issue, line: &str) -> Option<String> {
    INSECURE_HTTP_TITLE
        .is_match(&issue.title)
        .then(|| HTTP_SCHEME.replace_all(line, "https://").into_owned())
}

/// Whether a suggested fix reads like a single line of code rather than
/// prose.
#[must_use]
pub fn looks_like_code_line(text: &str) -> bool {
    if text.is_empty() || text.len() > 300 {
        return false;
    }
    let trimmed = text.trim();
    if trimmed.ends_with('.') && !trimmed.ends_with(");") {
        return false;
    }
    CODE_PUNCTUATION.is_match(trimmed) || CODE_TOKENS.is_match(trimmed)
}

/// Inline review comment for one issue.
///
/// A `suggestion` block is emitted for `replacement`, or for the issue's
/// suggested fix when it looks like a line of code; otherwise the fix is
/// shown as prose. `language` picks the fence of `snippet`.
#[must_use]
pub fn format_inline_comment(
    issue: &Issue,
    language: Language,
    snippet: Option<&str>,
    replacement: Option<&str>,
) -> String {
    let mut comment = format!(
        "{} **{}**\n\n{}\n\n",
        severity_badge(issue.severity),
        issue.title,
        issue.description
    );

    if let Some(snippet) = snippet {
        let _ = write!(comment, "```{}\n{snippet}\n```\n\n", language.fence());
    }

    let suggestion = replacement.or_else(|| {
        issue
            .suggested_fix
            .as_deref()
            .filter(|fix| looks_like_code_line(fix))
    });

    if let Some(body) = suggestion {
        let _ = write!(comment, "```suggestion\n{}\n```\n\n", body.replace('\r', ""));
    } else if let Some(fix) = &issue.suggested_fix {
        let _ = write!(comment, "### 💡 Suggested Fix\n\n{fix}\n\n");
    }

    if let Some(explanation) = &issue.explanation {
        let _ = write!(comment, "### 📝 Explanation\n\n{explanation}\n\n");
    }
    if let Some(cwe) = &issue.cwe {
        let _ = writeln!(comment, "**CWE:** {cwe}");
    }
    if let Some(owasp) = &issue.owasp {
        let _ = writeln!(comment, "**OWASP:** {owasp}");
    }

    let _ = writeln!(comment, "\n---\n*Detected by {}*", issue.source.label());
    comment
}

/// Comment listing every issue of one file, grouped by line.
///
/// Returns an empty string when there are no issues. Issues without a line
/// are counted but not listed.
#[must_use]
pub fn format_file_comment(path: &str, issues: &[Issue]) -> String {
    if issues.is_empty() {
        return String::new();
    }

    let critical = issues
        .iter()
        .filter(|i| i.severity == Severity::Critical)
        .count();
    let high = issues.iter().filter(|i| i.severity == Severity::High).count();

    let mut comment = format!("## 📄 Analysis Results for `{path}`\n\n");
    let _ = write!(comment, "Found **{} issue(s)**: ", issues.len());
    let breakdown: Vec<String> = [(critical, "critical"), (high, "high")]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}"))
        .collect();
    comment.push_str(&breakdown.join(", "));
    comment.push_str("\n\n");

    let mut by_line: BTreeMap<usize, Vec<&Issue>> = BTreeMap::new();
    for issue in issues {
        if let Some(line) = issue.line {
            by_line.entry(line).or_default().push(issue);
        }
    }

    for (line, line_issues) in by_line {
        let _ = write!(comment, "### Line {line}\n\n");
        for issue in line_issues {
            let _ = writeln!(
                comment,
                "{} **{}**",
                severity_badge(issue.severity),
                issue.title
            );
            let _ = writeln!(comment, "{}", issue.description);
            if let Some(fix) = &issue.suggested_fix {
                let _ = writeln!(comment, "💡 **Fix:** {fix}");
            }
            comment.push('\n');
        }
    }

    comment
}
