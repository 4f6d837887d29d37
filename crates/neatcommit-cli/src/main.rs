// SPDX-License-Identifier: Apache-2.0

//! NeatCommit - pattern-based code review for pull requests.
//!
//! Scans source trees and unified diffs for security vulnerabilities, code
//! smells and infrastructure misconfigurations, then renders the results as
//! terminal output, review comments or SARIF.
//!
//! Exit status: 0 on success, 1 when the quality gate fails or an error
//! occurs, 2 on invalid usage.

mod cli;
mod commands;
mod errors;
mod logging;
mod output;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use neatcommit_core::config;
use tracing::debug;

use crate::cli::{Cli, OutputContext};

fn run(cli: Cli) -> Result<bool> {
    let ctx = OutputContext::from_cli(cli.output, cli.quiet, cli.verbose);

    let config = config::load_config().context("Failed to load configuration")?;
    debug!("Configuration loaded successfully");

    if !config.ui.color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    commands::run(cli.command, &ctx, &config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            debug!("Quality gate failed");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("Error: {}", errors::format_error(&e));
            ExitCode::FAILURE
        }
    }
}
