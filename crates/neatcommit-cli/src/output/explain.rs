// SPDX-License-Identifier: Apache-2.0

//! Explain output rendering.

use std::io::{self, Write};

use console::style;

use super::Renderable;
use super::common::{severity_label, styled_score};
use crate::cli::OutputContext;
use crate::commands::types::ExplainResult;

impl Renderable for ExplainResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        let file = &self.file;
        writeln!(
            w,
            "{} ({})  {}",
            style(&file.path).cyan().bold(),
            file.language,
            styled_score(f64::from(file.score))
        )?;
        writeln!(w, "{}", style(&file.summary).dim())?;

        for issue in &file.issues {
            writeln!(w)?;
            let location = issue.line.map(|l| format!(" line {l}")).unwrap_or_default();
            writeln!(
                w,
                "{} {}{}",
                severity_label(issue.severity),
                style(&issue.title).bold(),
                style(location).dim()
            )?;
            writeln!(w, "  {}", issue.description)?;
            if let Some(snippet) = &issue.snippet {
                writeln!(w, "  {}", style(snippet).dim())?;
            }
            if let Some(fix) = &issue.suggested_fix {
                writeln!(w, "  {} {fix}", style("Fix:").green())?;
            }
            if ctx.verbose
                && let Some(explanation) = &issue.explanation
            {
                writeln!(w, "  {}", style(explanation).dim())?;
            }
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        if self.comments.is_empty() {
            return writeln!(w, "### ✅ No Issues Found in `{}`", self.file.path);
        }
        writeln!(w, "{}", self.comments.join("\n---\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::commands::explain::comments_for;
    use neatcommit_core::Analyzer;

    fn explain(path: &str, content: &str) -> ExplainResult {
        let file = Analyzer::default().analyze_file(path, content);
        let comments = comments_for(&file, content);
        ExplainResult { file, comments }
    }

    fn ctx() -> OutputContext {
        OutputContext {
            format: OutputFormat::Text,
            quiet: false,
            verbose: false,
            is_tty: false,
        }
    }

    #[test]
    fn test_text_shows_fix() {
        let mut buf = Vec::new();
        explain("settings.py", "password = \"hunter2\"\n")
            .render_text(&mut buf, &ctx())
            .unwrap();
        let output = console::strip_ansi_codes(&String::from_utf8(buf).unwrap()).into_owned();
        assert!(output.contains("settings.py (python)"));
        assert!(output.contains("CRITICAL"));
        assert!(output.contains("Fix:"));
    }

    #[test]
    fn test_markdown_without_issues() {
        let mut buf = Vec::new();
        explain("ok.py", "x = 1\n")
            .render_markdown(&mut buf, &ctx())
            .unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "### ✅ No Issues Found in `ok.py`\n"
        );
    }
}
