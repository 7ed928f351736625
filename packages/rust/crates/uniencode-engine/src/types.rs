//! Core types for the re-encoding pipeline.
//!
//! Defines detection results, per-file outcomes and engine configuration.

use std::path::PathBuf;

use crate::error::FailureReason;

/// Default per-file size limit (64 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Best guess from a charset detector.
///
/// Names are lower-cased, an empty name becomes `None` and confidence is
/// clamped into `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Detected encoding name, if any.
    pub encoding: Option<String>,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
}

impl Detection {
    /// Normalize a raw detector answer.
    pub fn new<S: AsRef<str>>(encoding: S, confidence: f32) -> Self {
        let name = encoding.as_ref().trim();
        Self {
            encoding: (!name.is_empty()).then(|| name.to_ascii_lowercase()),
            confidence: if confidence.is_nan() {
                0.0
            } else {
                confidence.clamp(0.0, 1.0)
            },
        }
    }

    /// A detection that found nothing.
    #[must_use]
    pub fn undetected() -> Self {
        Self {
            encoding: None,
            confidence: 0.0,
        }
    }
}

/// Confidence band governing the conversion strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Too unreliable to act on.
    Low,
    /// Trusted only line by line.
    Medium,
    /// Trusted for a single whole-file pass.
    High,
}

/// Confidence cut-offs.
///
/// `confidence <= low` is [`Tier::Low`], `low < confidence <= high` is
/// [`Tier::Medium`], anything above `high` is [`Tier::High`]. In the
/// line-by-line pass a line is only transcoded when its own confidence is at
/// least `line`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Upper bound (inclusive) of the low tier.
    pub low: f32,
    /// Upper bound (inclusive) of the medium tier.
    pub high: f32,
    /// Minimum per-line confidence in the medium tier.
    pub line: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 0.5,
            high: 0.7,
            line: 0.7,
        }
    }
}

impl Thresholds {
    /// Classify a whole-file confidence.
    #[must_use]
    pub fn classify(&self, confidence: f32) -> Tier {
        if confidence <= self.low {
            Tier::Low
        } else if confidence <= self.high {
            Tier::Medium
        } else {
            Tier::High
        }
    }
}

/// Configuration for the decision engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Confidence cut-offs.
    pub thresholds: Thresholds,
    /// Files larger than this are refused.
    pub max_file_size: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// One file scheduled for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    /// File to process.
    pub path: PathBuf,
}

/// Why a file was deliberately left alone.
#[derive(Debug, Clone, PartialEq)]
pub enum UnchangedReason {
    /// Whole-file confidence fell in the low tier.
    LowConfidence {
        /// Detected encoding.
        encoding: String,
        /// Detector confidence.
        confidence: f32,
    },
    /// Content detected as plain ASCII.
    Ascii,
    /// Content is already in the target encoding.
    AlreadyTarget,
}

/// Result of processing one file.
#[derive(Debug)]
pub enum ConversionOutcome {
    /// Nothing was written.
    Unchanged(UnchangedReason),
    /// Whole file transcoded and swapped in.
    Converted,
    /// Medium-confidence line-by-line pass; the replacement was swapped in.
    PartiallyConverted {
        /// Lines whose bytes changed.
        changed_lines: usize,
        /// Whether some lines were passed through untouched because they
        /// could not be detected or transcoded.
        problem_lines: bool,
    },
    /// Conversion was attempted or refused; the file is untouched.
    Failed(FailureReason),
}

impl ConversionOutcome {
    /// Whether the file's content was actually changed.
    #[must_use]
    pub fn is_change(&self) -> bool {
        match self {
            ConversionOutcome::Converted => true,
            ConversionOutcome::PartiallyConverted { changed_lines, .. } => *changed_lines > 0,
            ConversionOutcome::Unchanged(_) | ConversionOutcome::Failed(_) => false,
        }
    }
}
