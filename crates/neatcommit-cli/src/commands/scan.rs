// SPDX-License-Identifier: Apache-2.0

//! File discovery and the scan command.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use neatcommit_core::{
    AnalysisCache, AppConfig, Analyzer, RepoConfig, ScanConfig, SourceFile, cache_dir,
    load_repo_config, parse_repo_config,
};
use tracing::{debug, warn};

use super::maybe_spinner;
use super::types::ScanResult;
use crate::cli::{OutputContext, ScanArgs};

/// Files found by [`collect_files`].
#[derive(Debug, Default)]
pub struct CollectedFiles {
    /// Readable text files.
    pub files: Vec<SourceFile>,
    /// Files skipped as binary, oversized or unreadable.
    pub skipped: usize,
}

/// Whether more than 1% of the bytes are NUL.
fn looks_binary(bytes: &[u8]) -> bool {
    bytes.iter().filter(|b| **b == 0).count() * 100 / bytes.len().max(1) > 1
}

/// `path` relative to `root`, `/`-separated, without `./`.
fn display_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        path.to_string_lossy().into_owned()
    } else {
        parts.join("/")
    }
}

/// Directory that holds `.neatcommit.yml` and that reported paths are
/// relative to: the first path, or its parent when it is a file.
pub fn scan_root(paths: &[PathBuf]) -> PathBuf {
    let first = paths.first().map_or_else(|| PathBuf::from("."), Clone::clone);
    if first.is_file() {
        first
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    } else {
        first
    }
}

/// Walks `paths`, honoring `.gitignore`, and reads every text file.
///
/// Hidden entries are skipped unless `scan.hidden` is set; files larger than
/// `scan.max_file_size_kb` and binary files are counted as skipped.
pub fn collect_files(paths: &[PathBuf], root: &Path, scan: &ScanConfig) -> Result<CollectedFiles> {
    let max_bytes = scan.max_file_size_kb.saturating_mul(1024);
    let mut collected = CollectedFiles::default();

    for path in paths {
        if !path.exists() {
            anyhow::bail!("Path not found: {}", path.display());
        }

        let walker = WalkBuilder::new(path)
            .hidden(!scan.hidden)
            .follow_links(scan.follow_symlinks)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    collected.skipped += 1;
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if max_bytes != 0
                && entry
                    .metadata()
                    .is_ok_and(|metadata| metadata.len() > max_bytes)
            {
                debug!(path = %entry.path().display(), "Skipping file over size limit");
                collected.skipped += 1;
                continue;
            }

            let bytes = match std::fs::read(entry.path()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Failed to read file");
                    collected.skipped += 1;
                    continue;
                }
            };
            if looks_binary(&bytes) {
                debug!(path = %entry.path().display(), "Skipping binary file");
                collected.skipped += 1;
                continue;
            }
            let Ok(content) = String::from_utf8(bytes) else {
                debug!(path = %entry.path().display(), "Skipping non UTF-8 file");
                collected.skipped += 1;
                continue;
            };

            collected
                .files
                .push(SourceFile::new(display_path(root, entry.path()), content));
        }
    }

    debug!(
        files = collected.files.len(),
        skipped = collected.skipped,
        "File discovery completed"
    );
    Ok(collected)
}

/// Loads `--repo-config FILE`, or `.neatcommit.yml` under `root`.
pub fn resolve_repo_config(explicit: Option<&Path>, root: &Path) -> Result<RepoConfig> {
    match explicit {
        Some(path) => {
            let raw = std::fs::read_to_string(path).with_context(|| {
                format!("Failed to read repository config {}", path.display())
            })?;
            Ok(parse_repo_config(&raw))
        }
        None => load_repo_config(root).context("Failed to load repository config"),
    }
}

/// Runs the scan command.
pub fn run(args: &ScanArgs, ctx: &OutputContext, config: &AppConfig) -> Result<ScanResult> {
    let root = scan_root(&args.paths);
    let repo_config = resolve_repo_config(args.repo_config.as_deref(), &root)?;

    let spinner = maybe_spinner(ctx, config, "Collecting files...");
    let collected = collect_files(&args.paths, &root, &config.scan)?;

    let mut analyzer = Analyzer::new(repo_config, config.analysis.clone());
    if config.cache.enabled && !args.no_cache {
        analyzer = analyzer.with_cache(AnalysisCache::new(cache_dir(), config.cache.ttl_hours));
    }

    if let Some(s) = &spinner {
        s.set_message(format!("Analyzing {} files...", collected.files.len()));
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.scan.threads)
        .build()
        .context("Failed to start worker threads")?;
    let report = pool.install(|| analyzer.analyze_files(&collected.files));

    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    Ok(ScanResult {
        report,
        skipped_files: collected.skipped,
        pr: args.pr,
        file_comments: args.file_comments,
    })
}
