// SPDX-License-Identifier: Apache-2.0

//! Security scanner orchestration for files and unified diffs.

use crate::language::detect_language;
use crate::repo_config::RepoConfig;
use crate::security::patterns::PatternEngine;
use crate::security::types::Finding;

/// Lines added to one file by a unified diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffFile {
    /// Path from the `+++ b/<path>` header.
    pub path: String,
    /// Added lines as `(new line number, text)`.
    pub added_lines: Vec<(usize, String)>,
}

/// Position inside the current hunk.
#[derive(Debug, Clone, Copy)]
struct Hunk {
    /// New-side line number of the next added or context line.
    next_line: usize,
    /// New-side lines the header announced and not yet seen.
    remaining: usize,
}

/// Splits a unified diff into per-file added lines.
///
/// Removed lines are dropped. Files deleted by the diff (`+++ /dev/null`)
/// are skipped entirely. Added lines are only taken inside a hunk with a
/// valid `@@ -a,b +start,count @@` header, so every reported line is at
/// least 1. While the header's `count` is not used up, a `+++ ` line is an
/// added line, not the next file header.
#[must_use]
pub fn parse_diff(diff: &str) -> Vec<DiffFile> {
    let mut files: Vec<DiffFile> = Vec::new();
    let mut current: Option<DiffFile> = None;
    let mut hunk: Option<Hunk> = None;

    for line in diff.lines() {
        let in_hunk_body = hunk.is_some_and(|h| h.remaining > 0);

        if !in_hunk_body && let Some(header) = line.strip_prefix("+++ ") {
            if let Some(done) = current.take() {
                files.push(done);
            }
            current = target_path(header).map(|path| DiffFile {
                path,
                added_lines: Vec::new(),
            });
            hunk = None;
            continue;
        }

        if !in_hunk_body && line.starts_with("@@") {
            hunk = parse_hunk_header(line);
            continue;
        }

        let (Some(file), Some(h)) = (current.as_mut(), hunk.as_mut()) else {
            continue;
        };

        if let Some(code) = line.strip_prefix('+') {
            file.added_lines.push((h.next_line, code.to_string()));
            h.next_line += 1;
            h.remaining = h.remaining.saturating_sub(1);
        } else if line.starts_with(' ') || line.is_empty() {
            h.next_line += 1;
            h.remaining = h.remaining.saturating_sub(1);
        }
        // '-' and '\ No newline at end of file' do not advance the new side.
    }

    if let Some(done) = current {
        files.push(done);
    }
    files
}

/// Path of the new side, or `None` for deletions.
fn target_path(header: &str) -> Option<String> {
    // `diff -u` appends a tab and a timestamp.
    let path = header.split('\t').next().unwrap_or(header).trim();
    if path == "/dev/null" || path.is_empty() {
        return None;
    }
    Some(path.strip_prefix("b/").unwrap_or(path).to_string())
}

/// Parses `+start[,count]` from `@@ -a,b +start,count @@`.
///
/// `None` when the new side is missing, malformed or starts at line 0.
fn parse_hunk_header(header: &str) -> Option<Hunk> {
    let new_side = header
        .split_whitespace()
        .skip(1)
        .find(|part| part.starts_with('+'))?
        .trim_start_matches('+');
    let (start, count) = match new_side.split_once(',') {
        Some((start, count)) => (start.parse::<usize>().ok()?, count.parse::<usize>().ok()?),
        None => (new_side.parse::<usize>().ok()?, 1),
    };
    (start > 0).then_some(Hunk {
        next_line: start,
        remaining: count,
    })
}

/// Security scanner for files and code changes.
#[derive(Debug)]
pub struct SecurityScanner {
    engine: &'static PatternEngine,
    config: RepoConfig,
}

impl SecurityScanner {
    /// Creates a new security scanner using the global pattern engine.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RepoConfig::default())
    }

    /// Creates a new security scanner honoring a repository configuration.
    #[must_use]
    pub fn with_config(config: RepoConfig) -> Self {
        Self {
            engine: PatternEngine::global(),
            config,
        }
    }

    /// The repository configuration in effect.
    #[must_use]
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Scans a unified diff. Only added lines are inspected; line numbers
    /// refer to the new version of each file.
    #[must_use]
    pub fn scan_diff(&self, diff: &str) -> Vec<Finding> {
        self.scan_diff_files(&parse_diff(diff))
    }

    /// Scans already parsed diff files.
    #[must_use]
    pub fn scan_diff_files(&self, files: &[DiffFile]) -> Vec<Finding> {
        let mut findings = Vec::new();

        for file in files {
            if self.config.is_path_ignored(&file.path) {
                tracing::debug!(file = %file.path, "Skipping ignored path");
                continue;
            }
            let language = detect_language(&file.path).language;

            for (line_number, code) in &file.added_lines {
                for mut finding in self.engine.scan(code, &file.path, language) {
                    finding.line_number = *line_number;
                    findings.push(finding);
                }
            }
        }

        self.finish(findings)
    }

    /// Scans file content directly (not a diff).
    ///
    /// Skips scanning entirely if the path is ignored by the repository
    /// configuration. Category toggles and rule settings are applied to the
    /// result.
    #[must_use]
    pub fn scan_file(&self, content: &str, file_path: &str) -> Vec<Finding> {
        if self.config.is_path_ignored(file_path) {
            return Vec::new();
        }

        let language = detect_language(file_path).language;
        self.finish(self.engine.scan(content, file_path, language))
    }

    fn finish(&self, findings: Vec<Finding>) -> Vec<Finding> {
        let findings = self.config.filter_categories(findings);
        self.config.apply_rules(findings)
    }
}

impl Default for SecurityScanner {
    fn default() -> Self {
        Self::new()
    }
}
