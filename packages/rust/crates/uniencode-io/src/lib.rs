#![allow(clippy::doc_markdown)]

//! uniencode-io - Safe file access for the uniencode re-encoder
//!
//! Everything that touches the filesystem on behalf of the engine lives here.
//!
//! # Features
//!
//! - **Bounded reads**: size limits, symlinks and non-regular files refused
//! - **Binary sniffing**: pure-bytes heuristic or the `file(1)` utility
//! - **Atomic rewrites**: temp file in the same directory, fsync, rename
//!
//! # Architecture (ODF-REP Compliant)
//!
//! ```text
//! uniencode-io/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # IoError enum
//! ├── detect.rs   # Byte-level binary heuristic
//! ├── sniff.rs    # BinarySniffer trait + implementations
//! ├── sync.rs     # Bounded synchronous reads
//! └── rewrite.rs  # replace_atomically
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use uniencode_io::{BinarySniffer, ContentSniffer, read_bytes_safe, replace_atomically};
//!
//! if !ContentSniffer.is_binary(path)? {
//!     let bytes = read_bytes_safe(path, 1024 * 1024)?;
//!     replace_atomically::<_, IoError, _>(path, |out| Ok(out.write_all(&bytes)?))?;
//! }
//! ```

// ============================================================================
// Module Declarations (ODF-REP: Atomic Structure)
// ============================================================================

mod detect;
mod error;
mod rewrite;
mod sniff;
mod sync;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use error::IoError;
pub use rewrite::replace_atomically;
pub use sniff::{BinarySniffer, ContentSniffer, FileCommandSniffer};
pub use sync::{check_regular_file, read_bytes_safe, read_prefix};

// Re-export detection utilities for advanced use
pub use detect::{SNIFF_LEN, is_binary};
