// SPDX-License-Identifier: Apache-2.0

//! Error types for NeatCommit.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.

use thiserror::Error;

/// Errors that can occur during NeatCommit operations.
#[derive(Error, Debug)]
pub enum NeatcommitError {
    /// Application configuration file error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// Repository configuration (`.neatcommit.yml`) could not be parsed.
    #[error("Invalid repository config {path}: {message}")]
    RepoConfig {
        /// Path of the offending file, or `<inline>` for raw input.
        path: String,
        /// Parser error message.
        message: String,
    },

    /// A glob in `ignore.paths` or `duplication.ignorePatterns` is malformed.
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidGlob {
        /// The glob as written in the config.
        pattern: String,
        /// Reason reported by the glob compiler.
        message: String,
    },

    /// Reading a source file or diff failed.
    #[error("Failed to read {path}")]
    Io {
        /// Path that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Analysis cache could not be read or written.
    #[error("Cache error: {message}")]
    Cache {
        /// Error message.
        message: String,
    },
}

impl From<config::ConfigError> for NeatcommitError {
    fn from(err: config::ConfigError) -> Self {
        NeatcommitError::Config {
            message: err.to_string(),
        }
    }
}
