//! Error types for the re-encoding engine.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use thiserror::Error;
use uniencode_io::IoError;

/// Fatal, invocation-level errors.
///
/// These abort a whole run. Per-file problems never surface here; they are
/// reported as [`FailureReason`] inside a `ConversionOutcome`.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Requested target encoding does not name a known codec.
    #[error("unknown encoding: {0}")]
    UnknownCodecName(String),

    /// File name pattern is not a valid glob.
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] globset::Error),

    /// Recursive mode was pointed at something that is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Worker thread pool could not be created.
    #[error("Worker pool error: {0}")]
    ThreadPool(String),
}

/// Why a single file could not be converted.
///
/// Every variant leaves the file exactly as it was.
#[derive(Error, Debug)]
pub enum FailureReason {
    /// The detector returned no encoding at all.
    #[error("cannot detect encoding")]
    Undetectable,

    /// Decoded text has characters the target encoding cannot represent.
    #[error("changing from {from} to {to} is not possible")]
    UnsupportedTranscode {
        /// Detected source encoding.
        from: String,
        /// Requested target encoding.
        to: String,
    },

    /// The detected encoding does not actually decode the bytes.
    #[error("wrong encoding guess ({encoding})")]
    BadEncodingGuess {
        /// Encoding the detector proposed.
        encoding: String,
    },

    /// The detector named an encoding no codec is available for.
    #[error("detected encoding {0} is not supported")]
    UnknownSourceCodec(String),

    /// Reading, writing or replacing the file failed.
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Failure inside a transcode pass, before the file is swapped in.
///
/// Returned from the rewrite closure so that rollback is a plain `Err` branch.
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// Source bytes are invalid in the source encoding.
    #[error("bytes are not valid {encoding}")]
    Decode {
        /// Source encoding.
        encoding: String,
    },

    /// A line contains characters the target encoding cannot represent.
    #[error("line {line} cannot be encoded as {target}")]
    Encode {
        /// Target encoding.
        target: String,
        /// 1-based line number of the first unencodable line.
        line: usize,
    },

    /// Writing the replacement failed.
    #[error(transparent)]
    Io(#[from] IoError),
}

impl From<std::io::Error> for TranscodeError {
    fn from(e: std::io::Error) -> Self {
        TranscodeError::Io(IoError::System(e))
    }
}
