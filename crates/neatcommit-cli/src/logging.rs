// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the NeatCommit CLI.
//!
//! Uses `tracing` with `tracing-subscriber` for structured logging to stderr,
//! so that JSON, YAML and SARIF on stdout stay machine-readable.
//!
//! # Examples
//!
//! ```bash
//! # Per-file timings and cache hits
//! RUST_LOG=neatcommit_core=debug neatcommit scan .
//!
//! # Every pattern match
//! neatcommit -v scan src/
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter directives.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "neatcommit=debug,neatcommit_core=debug,neatcommit_cli=debug"
    } else {
        "neatcommit=warn,neatcommit_core=warn,neatcommit_cli=warn"
    }
}

/// Initialize the logging subsystem.
///
/// `RUST_LOG` takes precedence; otherwise only warnings are shown, or
/// debug output with `--verbose`.
pub fn init_logging(verbose: bool) {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        for verbose in [false, true] {
            assert!(EnvFilter::try_new(default_filter(verbose)).is_ok());
        }
        assert!(default_filter(true).contains("neatcommit_core=debug"));
    }
}
