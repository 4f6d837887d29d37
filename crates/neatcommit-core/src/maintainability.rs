// SPDX-License-Identifier: Apache-2.0

//! Technical debt estimate: remediation minutes and a letter grade.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::issue::SeverityCounts;
use crate::security::types::Severity;

/// Maintainability grade, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

/// Upper bound (inclusive) of remediation minutes for each grade below F.
const GRADE_THRESHOLDS: [(u64, Grade); 4] = [
    (30, Grade::A),
    (60, Grade::B),
    (120, Grade::C),
    (240, Grade::D),
];

/// Estimated minutes to fix one issue of `severity`.
#[must_use]
pub fn minutes_for(severity: Severity) -> u64 {
    match severity {
        Severity::Critical => 60,
        Severity::High => 30,
        Severity::Medium => 15,
        Severity::Low => 5,
        Severity::Info => 2,
    }
}

/// Total remediation minutes for the given counts.
#[must_use]
pub fn remediation_minutes(counts: &SeverityCounts) -> u64 {
    Severity::ALL
        .iter()
        .map(|&severity| counts.get(severity) as u64 * minutes_for(severity))
        .sum()
}

/// Maps remediation minutes to a grade.
#[must_use]
pub fn grade_for(minutes: u64) -> Grade {
    GRADE_THRESHOLDS
        .iter()
        .find(|(max, _)| minutes <= *max)
        .map_or(Grade::F, |(_, grade)| *grade)
}

/// Remediation estimate of a file or a whole report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainability {
    /// Estimated minutes to fix every issue.
    pub remediation_minutes: u64,
    /// Grade for those minutes.
    pub grade: Grade,
}

impl Maintainability {
    /// Estimate for the given issue counts.
    #[must_use]
    pub fn from_counts(counts: &SeverityCounts) -> Self {
        let remediation_minutes = remediation_minutes(counts);
        Self {
            remediation_minutes,
            grade: grade_for(remediation_minutes),
        }
    }
}

impl Default for Maintainability {
    fn default() -> Self {
        Self {
            remediation_minutes: 0,
            grade: Grade::A,
        }
    }
}
