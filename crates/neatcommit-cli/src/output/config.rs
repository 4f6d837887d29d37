// SPDX-License-Identifier: Apache-2.0

//! Config output rendering.

use std::io::{self, Write};

use console::style;

use super::Renderable;
use crate::cli::OutputContext;
use crate::commands::types::{ConfigCheckResult, ConfigPathResult, ConfigShowResult};

impl Renderable for ConfigShowResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        let note = if self.exists { "" } else { " (not found, defaults)" };
        writeln!(
            w,
            "{} {}{}",
            style("#").dim(),
            self.path.display(),
            style(note).dim()
        )?;
        let body = toml::to_string_pretty(&self.config).map_err(io::Error::other)?;
        write!(w, "{body}")
    }
}

impl Renderable for ConfigPathResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "{}", self.path.display())
    }
}

impl Renderable for ConfigCheckResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        match &self.path {
            Some(path) => writeln!(
                w,
                "{} {} is valid",
                style("✓").green().bold(),
                path.display()
            ),
            None => writeln!(
                w,
                "{} No .neatcommit.yml found; defaults apply",
                style("!").yellow().bold()
            ),
        }
    }
}
