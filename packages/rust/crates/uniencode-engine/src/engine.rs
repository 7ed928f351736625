//! Transcode decision engine.
//!
//! Reads a file, asks the detector once for the whole content and picks a
//! strategy by confidence tier:
//!
//! ```text
//! confidence <= low          -> leave the file alone
//! low < confidence <= high   -> re-detect and transcode line by line
//! confidence > high          -> transcode the whole file in one pass
//! ```
//!
//! Every write goes through [`replace_atomically`], so a failed pass never
//! leaves a half-written file behind.

use std::io::Write;
use std::path::Path;

use uniencode_io::{IoError, read_bytes_safe, replace_atomically};

use crate::charset::{ChardetDetector, CharsetDetector};
use crate::codec::{Codec, TargetEncoding, is_ascii_name};
use crate::error::{FailureReason, TranscodeError};
use crate::types::{ConversionOutcome, EngineConfig, Tier, UnchangedReason};

/// Per-file counters from a line-by-line pass.
#[derive(Debug, Default, Clone, Copy)]
struct LineStats {
    lines: usize,
    changed: usize,
    problems: bool,
}

/// Confidence-tiered re-encoding engine.
///
/// # Example
///
/// ```rust,ignore
/// use uniencode_engine::{Engine, EngineConfig, TargetEncoding};
///
/// let engine = Engine::new(EngineConfig::default());
/// let target = TargetEncoding::from_label("utf-8")?;
/// let outcome = engine.decide_and_convert(Path::new("subs.srt"), &target);
/// ```
#[derive(Debug, Clone)]
pub struct Engine<D = ChardetDetector> {
    detector: D,
    config: EngineConfig,
}

impl Engine<ChardetDetector> {
    /// Engine using the `chardet` oracle.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_detector(ChardetDetector, config)
    }
}

impl Default for Engine<ChardetDetector> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<D: CharsetDetector> Engine<D> {
    /// Engine using a custom detector.
    pub fn with_detector(detector: D, config: EngineConfig) -> Self {
        Self { detector, config }
    }

    /// Decide how to re-encode `path` into `target` and do it.
    ///
    /// Never panics and never returns early with a partial write: every
    /// failure is a [`ConversionOutcome::Failed`] with the file untouched.
    pub fn decide_and_convert(&self, path: &Path, target: &TargetEncoding) -> ConversionOutcome {
        let content = match read_bytes_safe(path, self.config.max_file_size) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Cannot read {}: {e}", path.display());
                return ConversionOutcome::Failed(FailureReason::Io(e));
            }
        };

        let detection = self.detector.detect(&content);
        let Some(encoding) = detection.encoding else {
            tracing::warn!("Cannot detect file {} encoding", path.display());
            return ConversionOutcome::Failed(FailureReason::Undetectable);
        };
        let confidence = detection.confidence;

        match self.config.thresholds.classify(confidence) {
            Tier::Low => {
                tracing::info!(
                    "Not changing {} from {encoding} to {target}, LOW confidence ({confidence:.2})",
                    path.display()
                );
                ConversionOutcome::Unchanged(UnchangedReason::LowConfidence {
                    encoding,
                    confidence,
                })
            }
            Tier::Medium => self.convert_lines(path, &content, confidence, target),
            Tier::High => self.convert_whole(path, &content, &encoding, confidence, target),
        }
    }

    /// High tier: one strict decode, then line-wise encode into the
    /// replacement.
    fn convert_whole(
        &self,
        path: &Path,
        content: &[u8],
        encoding: &str,
        confidence: f32,
        target: &TargetEncoding,
    ) -> ConversionOutcome {
        if is_ascii_name(encoding) {
            tracing::debug!("{} is ascii, nothing to do", path.display());
            return ConversionOutcome::Unchanged(UnchangedReason::Ascii);
        }
        let target_codec = target.codec();
        let bom_agrees = target_codec.has_bom(content) != target_codec.bom().is_empty();
        if target.matches(encoding) && bom_agrees {
            tracing::debug!("{} is already {target}", path.display());
            return ConversionOutcome::Unchanged(UnchangedReason::AlreadyTarget);
        }
        let Some(source) = Codec::for_label(encoding) else {
            tracing::warn!(
                "Detected encoding {encoding} of {} is not supported, file remains unchanged",
                path.display()
            );
            return ConversionOutcome::Failed(FailureReason::UnknownSourceCodec(
                encoding.to_string(),
            ));
        };

        tracing::info!(
            "Changing {} from {encoding} to {target}, with confidence {confidence:.2}",
            path.display()
        );

        let result = replace_atomically(path, |out| {
            transcode_whole(content, source, target.codec(), out)
        });

        match result {
            Ok(()) => ConversionOutcome::Converted,
            Err(TranscodeError::Decode { .. }) => {
                tracing::warn!(
                    "Wrong encoding guess. {} remains unchanged",
                    path.display()
                );
                ConversionOutcome::Failed(FailureReason::BadEncodingGuess {
                    encoding: encoding.to_string(),
                })
            }
            Err(TranscodeError::Encode { line, .. }) => {
                tracing::warn!(
                    "Changing {} from {encoding} to {target} is NOT possible (line {line})",
                    path.display()
                );
                ConversionOutcome::Failed(FailureReason::UnsupportedTranscode {
                    from: encoding.to_string(),
                    to: target.label().to_string(),
                })
            }
            Err(TranscodeError::Io(e)) => {
                tracing::warn!("Cannot rewrite {}: {e}", path.display());
                ConversionOutcome::Failed(FailureReason::Io(e))
            }
        }
    }

    /// Medium tier: the whole-file guess is not trusted, each line gets its
    /// own detection. Lines that cannot be handled pass through untouched.
    fn convert_lines(
        &self,
        path: &Path,
        content: &[u8],
        confidence: f32,
        target: &TargetEncoding,
    ) -> ConversionOutcome {
        tracing::info!(
            "Changing {} row by row to {target}, with confidence {confidence:.2}",
            path.display()
        );

        let result = replace_atomically::<_, IoError, _>(path, |out| {
            self.transcode_lines(content, target, out)
        });

        match result {
            Ok(stats) => {
                if stats.problems {
                    tracing::warn!(
                        "Some lines of {} had corrupted encodings and remained unchanged",
                        path.display()
                    );
                }
                tracing::debug!(
                    "{}: {} of {} lines re-encoded",
                    path.display(),
                    stats.changed,
                    stats.lines
                );
                ConversionOutcome::PartiallyConverted {
                    changed_lines: stats.changed,
                    problem_lines: stats.problems,
                }
            }
            Err(e) => {
                tracing::warn!("Cannot rewrite {}: {e}", path.display());
                ConversionOutcome::Failed(FailureReason::Io(e))
            }
        }
    }

    fn transcode_lines(
        &self,
        content: &[u8],
        target: &TargetEncoding,
        out: &mut dyn Write,
    ) -> Result<LineStats, IoError> {
        let mut stats = LineStats::default();

        for line in content.split_inclusive(|&b| b == b'\n') {
            stats.lines += 1;
            match self.transcode_line(line, target) {
                Some(bytes) => {
                    if bytes != line {
                        stats.changed += 1;
                    }
                    out.write_all(&bytes)?;
                }
                None => {
                    stats.problems = true;
                    out.write_all(line)?;
                }
            }
        }

        Ok(stats)
    }

    /// Re-encode one line, or `None` when it must be copied verbatim.
    fn transcode_line(&self, line: &[u8], target: &TargetEncoding) -> Option<Vec<u8>> {
        let detection = self.detector.detect(line);
        let encoding = detection.encoding?;
        if detection.confidence < self.config.thresholds.line {
            return None;
        }

        let source = Codec::for_label(&encoding)?;
        let text = source.decode(line)?;
        let encoded = target.codec().encode(&text)?;
        Some(encoded.into_owned())
    }
}

/// Decode all of `content` as `source`, then write it line by line as
/// `target`. A leading byte order mark of the source is dropped and the
/// target's own mark, if it has one, is written first. Stops at the first
/// line that cannot be encoded.
fn transcode_whole(
    content: &[u8],
    source: Codec,
    target: Codec,
    out: &mut dyn Write,
) -> Result<(), TranscodeError> {
    let text = source.decode_document(content).ok_or_else(|| TranscodeError::Decode {
        encoding: source.name().to_string(),
    })?;

    out.write_all(target.bom())?;
    for (index, line) in text.split_inclusive('\n').enumerate() {
        let bytes = target.encode(line).ok_or_else(|| TranscodeError::Encode {
            target: target.name().to_string(),
            line: index + 1,
        })?;
        out.write_all(&bytes)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_whole(content: &[u8], source: &str, target: &str) -> Result<Vec<u8>, TranscodeError> {
        let mut out = Vec::new();
        transcode_whole(
            content,
            Codec::for_label(source).unwrap(),
            Codec::for_label(target).unwrap(),
            &mut out,
        )?;
        Ok(out)
    }

    #[test]
    fn test_transcode_whole_round_trip() {
        let greek = "αυτά είναι ελληνικά\nδεύτερη γραμμή\n";
        let (source, _, _) = encoding_rs::ISO_8859_7.encode(greek);
        let out = run_whole(&source, "iso-8859-7", "utf-8").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), greek);
    }

    #[test]
    fn test_transcode_whole_reports_encode_line() {
        let text = "plain\nαυτά\n";
        let err = run_whole(text.as_bytes(), "utf-8", "iso-8859-1").unwrap_err();
        assert!(matches!(err, TranscodeError::Encode { line: 2, .. }));
    }

    #[test]
    fn test_transcode_whole_bad_guess() {
        let err = run_whole(&[0xe1, 0xf5, 0xf4, 0xdc], "utf-8", "iso-8859-7").unwrap_err();
        assert!(matches!(err, TranscodeError::Decode { .. }));
    }
}
