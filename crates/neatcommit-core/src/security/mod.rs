// SPDX-License-Identifier: Apache-2.0

//! Security scanning module for vulnerability detection.
//!
//! Provides pattern-based security scanning for files and code changes.
//! Uses regex patterns to detect common vulnerabilities like hardcoded secrets,
//! SQL injection, XSS, and other OWASP/CWE issues.

pub mod patterns;
pub mod scanner;
pub mod types;

pub use patterns::PatternEngine;
pub use scanner::{DiffFile, SecurityScanner, parse_diff};
pub use types::{Category, Finding, PatternDefinition, Severity};
