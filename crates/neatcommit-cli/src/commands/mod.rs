// SPDX-License-Identifier: Apache-2.0

//! Command handlers for the NeatCommit CLI.

pub mod completion;
pub mod config;
pub mod diff;
pub mod explain;
pub mod info;
pub mod scan;
pub mod types;

use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use neatcommit_core::AppConfig;

use crate::cli::{Commands, ConfigCommand, OutputContext};
use crate::output;

/// Creates a styled spinner (only if interactive and enabled in config).
fn maybe_spinner(ctx: &OutputContext, config: &AppConfig, message: &str) -> Option<ProgressBar> {
    if !ctx.is_interactive() || !config.ui.progress_bars {
        return None;
    }
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .ok()?;
    let s = ProgressBar::new_spinner();
    s.set_style(style);
    s.set_message(message.to_string());
    s.enable_steady_tick(Duration::from_millis(100));
    Some(s)
}

/// Dispatch to the appropriate command handler.
///
/// Returns `false` when a quality gate failed and the process should exit
/// with status 1.
pub fn run(command: Commands, ctx: &OutputContext, config: &AppConfig) -> Result<bool> {
    match command {
        Commands::Scan(args) => {
            let result = scan::run(&args, ctx, config)?;
            output::render(&result, ctx)?;
            Ok(result.report.quality_gate.passed || args.no_fail)
        }

        Commands::Diff {
            input,
            repo_config,
            no_fail,
        } => {
            let result = diff::run(&input, repo_config.as_deref(), config)?;
            output::render(&result, ctx)?;
            Ok(result.report.quality_gate.passed || no_fail)
        }

        Commands::Explain { file } => {
            let result = explain::run(&file, config)?;
            output::render(&result, ctx)?;
            Ok(true)
        }

        Commands::Rules { language } => {
            let result = info::run_rules(language.as_deref())?;
            output::render(&result, ctx)?;
            Ok(true)
        }

        Commands::Languages => {
            output::render(&info::run_languages(), ctx)?;
            Ok(true)
        }

        Commands::Config(config_cmd) => {
            match config_cmd {
                ConfigCommand::Show => output::render(&config::run_show(config), ctx)?,
                ConfigCommand::Path => output::render(&config::run_path(), ctx)?,
                ConfigCommand::Check { path } => {
                    output::render(&config::run_check(path.as_deref())?, ctx)?;
                }
            }
            Ok(true)
        }

        Commands::Completion { shell } => {
            completion::run_generate(shell)?;
            Ok(true)
        }
    }
}
