//! Batch driver - walk a tree and re-encode every matching text file.
//!
//! Candidates are collected depth-first with `walkdir` (symlinks are never
//! followed or processed), filtered by a `globset` file-name pattern, sniffed
//! for binary content and handed to the [`Engine`] one by one, or fanned out
//! over a rayon pool when more than one worker is requested. A failing file is
//! recorded and the walk moves on.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use globset::{Glob, GlobMatcher};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use uniencode_io::BinarySniffer;

use crate::charset::CharsetDetector;
use crate::codec::TargetEncoding;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::types::{ConversionOutcome, FileTask};

/// Configuration for a recursive run.
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Shell glob matched against file names (e.g., "*.srt")
    pub file_pattern: String,
    /// Number of parallel workers (1 = sequential, 0 = one per CPU)
    pub workers: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            file_pattern: "*".to_string(),
            workers: 1,
        }
    }
}

/// Aggregate result of a recursive run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BatchReport {
    /// Candidates that matched the pattern
    pub files_scanned: usize,
    /// Files whose content changed
    pub files_changed: usize,
    /// Changed files that kept some lines in their original encoding
    pub files_with_problem_lines: usize,
    /// Files skipped as binary
    pub binary_skipped: usize,
    /// Failures (path -> error message)
    pub errors: BTreeMap<String, String>,
}

/// Collect regular files under `root` whose name matches `pattern`.
///
/// Unreadable entries are logged and skipped.
///
/// # Errors
/// Returns `EngineError::NotADirectory` if `root` is not a directory and
/// `EngineError::Pattern` if `pattern` is not a valid glob.
pub fn collect_candidates(root: &Path, pattern: &str) -> Result<Vec<FileTask>, EngineError> {
    if !root.is_dir() {
        return Err(EngineError::NotADirectory(root.display().to_string()));
    }
    let matcher = compile_pattern(pattern)?;

    let tasks = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|result| match result {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| {
            if entry.path_is_symlink() {
                tracing::debug!("Ignoring link {}", entry.path().display());
                return false;
            }
            entry.file_type().is_file() && matcher.is_match(entry.file_name())
        })
        .map(|entry| FileTask {
            path: entry.into_path(),
        })
        .collect();

    Ok(tasks)
}

fn compile_pattern(pattern: &str) -> Result<GlobMatcher, EngineError> {
    Ok(Glob::new(pattern)?.compile_matcher())
}

/// Re-encode every matching text file under `root` into `target`.
///
/// Per-file failures never abort the run; they are collected in
/// [`BatchReport::errors`]. `report.files_changed` is the changed-count.
///
/// # Errors
/// Returns an `EngineError` only for invocation-level problems: a bad root,
/// a bad pattern or a worker pool that cannot be built.
pub fn walk_and_convert<D: CharsetDetector>(
    root: &Path,
    config: &WalkConfig,
    target: &TargetEncoding,
    engine: &Engine<D>,
    sniffer: &dyn BinarySniffer,
) -> Result<BatchReport, EngineError> {
    let tasks = collect_candidates(root, &config.file_pattern)?;

    let files_scanned = AtomicUsize::new(0);
    let files_changed = AtomicUsize::new(0);
    let files_with_problem_lines = AtomicUsize::new(0);
    let binary_skipped = AtomicUsize::new(0);
    let errors: DashMap<String, String> = DashMap::new();

    let process = |task: &FileTask| {
        files_scanned.fetch_add(1, Ordering::Relaxed);
        let path = &task.path;

        match sniffer.is_binary(path) {
            Ok(true) => {
                tracing::info!("Ignoring binary file {}", path.display());
                binary_skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Cannot inspect {}: {e}", path.display());
                errors.insert(path.display().to_string(), e.to_string());
                return;
            }
        }

        let outcome = engine.decide_and_convert(path, target);
        if outcome.is_change() {
            files_changed.fetch_add(1, Ordering::Relaxed);
        }
        match outcome {
            ConversionOutcome::PartiallyConverted {
                problem_lines: true,
                ..
            } => {
                files_with_problem_lines.fetch_add(1, Ordering::Relaxed);
            }
            ConversionOutcome::Failed(reason) => {
                errors.insert(path.display().to_string(), reason.to_string());
            }
            _ => {}
        }
    };

    if config.workers == 1 {
        tasks.iter().for_each(process);
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()
            .map_err(|e| EngineError::ThreadPool(e.to_string()))?;
        pool.install(|| tasks.par_iter().for_each(process));
    }

    let report = BatchReport {
        files_scanned: files_scanned.load(Ordering::Relaxed),
        files_changed: files_changed.load(Ordering::Relaxed),
        files_with_problem_lines: files_with_problem_lines.load(Ordering::Relaxed),
        binary_skipped: binary_skipped.load(Ordering::Relaxed),
        errors: errors.into_iter().collect(),
    };
    tracing::debug!(
        "Scanned {} files, changed {}, {} binary, {} failed",
        report.files_scanned,
        report.files_changed,
        report.binary_skipped,
        report.errors.len()
    );

    Ok(report)
}
