// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to `NeatcommitError` and appends a hint for
//! each error kind. Structured error data stays in the library; the
//! presentation lives here.

use anyhow::Error;
use neatcommit_core::error::NeatcommitError;

/// Formats an error for CLI display with helpful hints.
///
/// Context added with `anyhow` is kept in front of the library message.
/// Errors that are not a `NeatcommitError` are returned as their full chain.
pub fn format_error(error: &Error) -> String {
    let message = format!("{error:#}");

    let Some(err) = error.downcast_ref::<NeatcommitError>() else {
        return message;
    };

    let tip = match err {
        NeatcommitError::Config { .. } => format!(
            "Check your config file at {}",
            neatcommit_core::config_file_path().display()
        ),
        NeatcommitError::RepoConfig { .. } => {
            "Run `neatcommit config check` to validate .neatcommit.yml.".to_string()
        }
        NeatcommitError::InvalidGlob { .. } => {
            "Glob patterns use .gitignore syntax, e.g. `vendor/**` or `*.min.js`.".to_string()
        }
        NeatcommitError::Io { .. } => "Check that the path exists and is readable.".to_string(),
        NeatcommitError::Cache { .. } => format!(
            "Remove the cache directory {} or pass --no-cache.",
            neatcommit_core::cache_dir().display()
        ),
    };

    format!("{message}\n\nTip: {tip}")
}
