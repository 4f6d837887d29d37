// SPDX-License-Identifier: Apache-2.0

//! Scan and diff output rendering.

use std::io::{self, Write};

use console::style;
use neatcommit_core::{SarifReport, SeverityCounts, format_file_comment, format_summary_comment};

use super::Renderable;
use super::common::{severity_label, styled_grade, styled_score, write_gate};
use crate::cli::OutputContext;
use crate::commands::types::{DiffResult, ScanResult};

fn counts_line(counts: &SeverityCounts) -> String {
    format!(
        "{} (critical {}, high {}, medium {}, low {}, info {})",
        counts.total(),
        counts.critical,
        counts.high,
        counts.medium,
        counts.low,
        counts.info
    )
}

impl Renderable for ScanResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        let report = &self.report;

        if !ctx.quiet {
            for file in &report.files {
                if file.issues.is_empty() && !ctx.verbose {
                    continue;
                }
                writeln!(
                    w,
                    "{}  {}",
                    style(&file.path).cyan().bold(),
                    style(format!("score {}", file.score)).dim()
                )?;
                if ctx.verbose {
                    writeln!(w, "  {}", style(&file.summary).dim())?;
                }
                for issue in &file.issues {
                    let line = issue.line.map_or_else(String::new, |l| l.to_string());
                    let rule = issue
                        .rule_id
                        .as_deref()
                        .map(|id| format!(" {}", style(format!("[{id}]")).dim()))
                        .unwrap_or_default();
                    writeln!(
                        w,
                        "  {} {:>5}  {}{}",
                        severity_label(issue.severity),
                        line,
                        issue.title,
                        rule
                    )?;
                }
                writeln!(w)?;
            }
        }

        writeln!(w, "{}", style("Summary").bold())?;
        writeln!(
            w,
            "  {} {}/{} analyzed, {} skipped",
            style("Files:").dim(),
            report.analyzed_files,
            report.total_files,
            self.skipped_files
        )?;
        writeln!(w, "  {} {}", style("Issues:").dim(), counts_line(&report.counts))?;
        writeln!(
            w,
            "  {} {}",
            style("Security score:").dim(),
            styled_score(report.avg_score)
        )?;
        writeln!(
            w,
            "  {} {} ({} min)",
            style("Maintainability:").dim(),
            styled_grade(report.maintainability.grade),
            report.maintainability.remediation_minutes
        )?;
        write_gate(w, &report.quality_gate)
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        write!(w, "{}", format_summary_comment(&self.report, self.pr))?;

        if self.file_comments {
            for file in self.report.files.iter().filter(|f| !f.issues.is_empty()) {
                writeln!(w)?;
                write!(w, "{}", format_file_comment(&file.path, &file.issues))?;
            }
        }
        Ok(())
    }

    fn to_sarif(&self) -> Option<SarifReport> {
        Some(SarifReport::from(&self.report))
    }
}

impl Renderable for DiffResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        let report = &self.report;

        if !ctx.quiet {
            if report.findings.is_empty() {
                writeln!(w, "{}", style("No security issues in added lines.").green())?;
            }
            for finding in &report.findings {
                writeln!(
                    w,
                    "{} {}:{}  {} {}",
                    severity_label(finding.severity),
                    style(&finding.file_path).cyan(),
                    finding.line_number,
                    finding.title,
                    style(format!("[{}]", finding.rule_id)).dim()
                )?;
                if !finding.snippet.is_empty() {
                    writeln!(w, "         {}", style(&finding.snippet).dim())?;
                }
            }
        }

        writeln!(w)?;
        writeln!(w, "{}", style("Summary").bold())?;
        writeln!(w, "  {} {}", style("Files:").dim(), report.files_scanned)?;
        writeln!(w, "  {} {}", style("Findings:").dim(), counts_line(&report.counts))?;
        write_gate(w, &report.quality_gate)
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        let report = &self.report;
        writeln!(w, "## 🔍 Diff Security Scan\n")?;

        if report.findings.is_empty() {
            writeln!(w, "### ✅ No Issues Found")?;
            return Ok(());
        }

        writeln!(w, "| Severity | Location | Rule | Issue |")?;
        writeln!(w, "|---|---|---|---|")?;
        for finding in &report.findings {
            writeln!(
                w,
                "| {} | `{}:{}` | `{}` | {} |",
                finding.severity.label(),
                finding.file_path,
                finding.line_number,
                finding.rule_id,
                finding.title
            )?;
        }

        if !report.quality_gate.passed {
            writeln!(w, "\n### ❌ Quality gate failed\n")?;
            for reason in report.quality_gate.reasons() {
                writeln!(w, "- {reason}")?;
            }
        }
        Ok(())
    }

    fn to_sarif(&self) -> Option<SarifReport> {
        Some(SarifReport::from(&self.report))
    }
}
