#![allow(clippy::doc_markdown)]

//! uniencode-engine - Confidence-tiered text re-encoding
//!
//! Decides, per file, whether a charset guess is trustworthy enough to act on
//! and rewrites the file into a target encoding without ever leaving it half
//! written.
//!
//! # Features
//!
//! - **Detector adapter**: `chardet` oracle behind the `CharsetDetector` trait
//! - **Strict codecs**: `encoding_rs` without silent replacement
//! - **Three tiers**: low (leave alone), medium (line by line), high (whole file)
//! - **Batch walking**: glob-filtered, binary-aware, optionally parallel
//!
//! # Architecture (ODF-REP Compliant)
//!
//! ```text
//! uniencode-engine/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # EngineError, FailureReason, TranscodeError (thiserror)
//! ├── types.rs    # Detection, Thresholds, EngineConfig, ConversionOutcome
//! ├── charset.rs  # CharsetDetector trait + chardet adapter
//! ├── codec.rs    # Codec, TargetEncoding
//! ├── engine.rs   # Engine::decide_and_convert
//! └── batch.rs    # walk_and_convert with rayon
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use uniencode_engine::{Engine, EngineConfig, TargetEncoding, WalkConfig, walk_and_convert};
//! use uniencode_io::ContentSniffer;
//!
//! let engine = Engine::new(EngineConfig::default());
//! let target = TargetEncoding::from_label("utf-8")?;
//!
//! // Single file
//! let outcome = engine.decide_and_convert(Path::new("subs.srt"), &target);
//!
//! // Whole tree
//! let report = walk_and_convert(
//!     Path::new("/media/subs"),
//!     &WalkConfig {
//!         file_pattern: "*.srt".to_string(),
//!         ..Default::default()
//!     },
//!     &target,
//!     &engine,
//!     &ContentSniffer,
//! )?;
//! ```

// ============================================================================
// Module Declarations (ODF-REP: Atomic Structure)
// ============================================================================

mod batch;
mod charset;
mod codec;
mod engine;
mod error;
mod types;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use charset::{ChardetDetector, CharsetDetector};
pub use codec::{Codec, TargetEncoding, is_ascii_name};
pub use engine::Engine;
pub use error::{EngineError, FailureReason, TranscodeError};
pub use types::{
    ConversionOutcome, DEFAULT_MAX_FILE_SIZE, Detection, EngineConfig, FileTask, Thresholds,
    Tier, UnchangedReason,
};

// Batch driver exports
pub use batch::{BatchReport, WalkConfig, collect_candidates, walk_and_convert};
