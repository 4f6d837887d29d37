// SPDX-License-Identifier: Apache-2.0

//! Rules and languages table rendering.

use std::io::{self, Write};

use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL_CONDENSED};
use comfy_table::{ContentArrangement, Table};

use super::Renderable;
use crate::cli::OutputContext;
use crate::commands::types::{LanguagesResult, RulesResult};

fn table(preset: &str, header: &[&str]) -> Table {
    let arrangement = if preset == ASCII_MARKDOWN {
        ContentArrangement::Disabled
    } else {
        ContentArrangement::Dynamic
    };
    let mut table = Table::new();
    table
        .load_preset(preset)
        .set_content_arrangement(arrangement)
        .set_header(header.iter().copied());
    table
}

impl RulesResult {
    fn table(&self, preset: &str) -> Table {
        let mut table = table(preset, &["ID", "Severity", "Category", "Languages", "CWE"]);
        for rule in &self.rules {
            let languages = if rule.languages.is_empty() {
                "all".to_string()
            } else {
                rule.languages.join(", ")
            };
            table.add_row(vec![
                rule.id.clone(),
                rule.severity.clone(),
                rule.category.clone(),
                languages,
                rule.cwe.clone().unwrap_or_default(),
            ]);
        }
        table
    }
}

impl Renderable for RulesResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "{}", self.table(UTF8_FULL_CONDENSED))?;
        if !ctx.quiet {
            let scope = self
                .language
                .as_deref()
                .map(|l| format!(" for {l}"))
                .unwrap_or_default();
            writeln!(w, "{} rules{scope}", self.rules.len())?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "{}", self.table(ASCII_MARKDOWN))
    }
}

impl LanguagesResult {
    fn table(&self, preset: &str) -> Table {
        let mut table = table(preset, &["Language", "Extensions", "Structure"]);
        for language in &self.languages {
            table.add_row(vec![
                language.name.clone(),
                language.extensions.join(" "),
                if language.structure { "yes" } else { "no" }.to_string(),
            ]);
        }
        table
    }
}

impl Renderable for LanguagesResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "{}", self.table(UTF8_FULL_CONDENSED))
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "{}", self.table(ASCII_MARKDOWN))
    }
}
