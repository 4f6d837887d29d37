// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for NeatCommit.
//!
//! Uses clap's derive API for declarative CLI parsing.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Extended help text for the completion subcommand with shell-specific examples.
const COMPLETION_HELP: &str = r#"EXAMPLES

  bash
    Add to ~/.bashrc or ~/.bash_profile:
      eval "$(neatcommit completion bash)"

  zsh
    Generate completion file:
      mkdir -p ~/.zsh/completions
      neatcommit completion zsh > ~/.zsh/completions/_neatcommit

    Add to ~/.zshrc (before compinit):
      fpath=(~/.zsh/completions $fpath)
      autoload -U compinit && compinit -i

  fish
    neatcommit completion fish > ~/.config/fish/completions/neatcommit.fish

  PowerShell
    Add to $PROFILE:
      neatcommit completion powershell | Out-String | Invoke-Expression
"#;

/// Extended help text for the scan subcommand.
const SCAN_HELP: &str = r"EXAMPLES

  Scan the current directory:
    neatcommit scan

  Produce a pull request summary comment:
    neatcommit scan src/ --pr 42 -o markdown

  Upload results to code scanning:
    neatcommit scan -o sarif > results.sarif

EXIT STATUS

  0  the quality gate passed (or --no-fail was given)
  1  the quality gate failed or an error occurred
";

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors (default)
    #[default]
    Text,
    /// JSON output for programmatic consumption
    Json,
    /// YAML output for programmatic consumption
    Yaml,
    /// Markdown output for pull request comments
    Markdown,
    /// SARIF 2.1.0 for code scanning tools
    Sarif,
}

/// Global output configuration passed to commands.
#[derive(Clone, Debug)]
pub struct OutputContext {
    /// Output format
    pub format: OutputFormat,
    /// Suppress non-essential output (spinners, per-file text listings)
    pub quiet: bool,
    /// Enable verbose output (debug-level logging)
    pub verbose: bool,
    /// Whether stdout is a terminal (TTY)
    pub is_tty: bool,
}

impl OutputContext {
    /// Creates an `OutputContext` from CLI arguments.
    pub fn from_cli(format: OutputFormat, quiet: bool, verbose: bool) -> Self {
        Self {
            format,
            quiet,
            verbose,
            is_tty: std::io::stdout().is_terminal(),
        }
    }

    /// Returns true if interactive elements (spinners, colors) should be shown.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && !self.quiet && matches!(self.format, OutputFormat::Text)
    }
}

/// NeatCommit - pattern-based code review.
///
/// Scans source files and pull request diffs for security vulnerabilities,
/// code smells and infrastructure misconfigurations.
#[derive(Parser)]
#[command(name = "neatcommit")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    pub output: OutputFormat,

    /// Suppress non-essential output (spinners, per-file text listings)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug-level logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Analyze files and directories
    #[command(after_long_help = SCAN_HELP)]
    Scan(ScanArgs),

    /// Scan the added lines of a unified diff
    Diff {
        /// Diff file, or `-` for stdin
        #[arg(value_name = "FILE", default_value = "-")]
        input: String,

        /// Repository configuration (.neatcommit.yml)
        #[arg(long, value_name = "FILE")]
        repo_config: Option<PathBuf>,

        /// Exit successfully even when critical issues are found
        #[arg(long)]
        no_fail: bool,
    },

    /// Show review comments with suggested fixes for one file
    Explain {
        /// File to explain
        file: PathBuf,
    },

    /// List the security rules
    Rules {
        /// Only rules that apply to this language (e.g. python, go)
        #[arg(long, short = 'l')]
        language: Option<String>,
    },

    /// List supported languages and file extensions
    Languages,

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate a shell completion script (output to stdout)
    #[command(after_long_help = COMPLETION_HELP)]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of the scan command.
#[derive(clap::Args, Debug, Clone)]
pub struct ScanArgs {
    /// Files or directories to scan
    #[arg(value_name = "PATH", default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Pull request number for the summary comment header
    #[arg(long, value_name = "NUMBER")]
    pub pr: Option<u64>,

    /// Repository configuration (default: .neatcommit.yml in the first path)
    #[arg(long, value_name = "FILE")]
    pub repo_config: Option<PathBuf>,

    /// Analyze every file, ignoring cached results
    #[arg(long)]
    pub no_cache: bool,

    /// Include per-file comments in markdown output
    #[arg(long)]
    pub file_comments: bool,

    /// Exit successfully even when the quality gate fails
    #[arg(long)]
    pub no_fail: bool,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective application configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Validate a repository configuration file
    Check {
        /// File or repository directory (default: current directory)
        path: Option<PathBuf>,
    },
}
