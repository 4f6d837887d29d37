// SPDX-License-Identifier: Apache-2.0

//! Common UX helpers for consistent display across commands.

use console::{StyledObject, style};
use neatcommit_core::{Grade, QualityGateResult, Severity};
use std::io::{self, Write};

/// Severity label padded to a fixed width and colored by severity.
pub fn severity_label(severity: Severity) -> StyledObject<String> {
    let label = style(format!("{:<8}", severity.label()));
    match severity {
        Severity::Critical => label.red().bold(),
        Severity::High => label.red(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.blue(),
        Severity::Info => label.dim(),
    }
}

/// Score colored with the same thresholds as the summary emoji.
pub fn styled_score(score: f64) -> StyledObject<String> {
    let text = style(format!("{}/100", score.round()));
    if score >= 90.0 {
        text.green().bold()
    } else if score >= 70.0 {
        text.yellow().bold()
    } else {
        text.red().bold()
    }
}

/// Grade letter, green for A/B, yellow for C, red otherwise.
pub fn styled_grade(grade: Grade) -> StyledObject<String> {
    let text = style(grade.to_string());
    match grade {
        Grade::A | Grade::B => text.green().bold(),
        Grade::C => text.yellow().bold(),
        Grade::D | Grade::F => text.red().bold(),
    }
}

/// Gate reason without Markdown emphasis.
pub fn plain_reason(reason: &str) -> String {
    reason.replace("**", "")
}

/// Writes `Quality gate: PASSED` or `FAILED` with its reasons.
pub fn write_gate(w: &mut dyn Write, gate: &QualityGateResult) -> io::Result<()> {
    if gate.passed {
        writeln!(w, "  {} {}", style("Quality gate:").dim(), style("PASSED").green().bold())
    } else {
        writeln!(w, "  {} {}", style("Quality gate:").dim(), style("FAILED").red().bold())?;
        for reason in gate.reasons() {
            writeln!(w, "    - {}", plain_reason(reason))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_reason() {
        assert_eq!(
            plain_reason("**Critical issues** must be resolved before merge."),
            "Critical issues must be resolved before merge."
        );
    }

    #[test]
    fn test_write_gate_failed_lists_reasons() {
        let gate = QualityGateResult {
            passed: false,
            blocked_by_critical: true,
            below_min_score: false,
        };
        let mut buf = Vec::new();
        write_gate(&mut buf, &gate).unwrap();
        let output = console::strip_ansi_codes(&String::from_utf8(buf).unwrap()).into_owned();
        assert!(output.contains("FAILED"));
        assert!(output.contains("Critical issues must be resolved"));
    }

    #[test]
    fn test_severity_label_width() {
        let text = severity_label(Severity::Low).to_string();
        assert!(console::strip_ansi_codes(&text).starts_with("LOW     "));
    }
}
