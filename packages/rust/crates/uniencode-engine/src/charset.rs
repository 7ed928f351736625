//! Charset detector adapter.
//!
//! The engine treats detection as an oracle: bytes in, `(encoding,
//! confidence)` out. [`ChardetDetector`] is the production oracle; any
//! `Fn(&[u8]) -> Detection` closure also works, which keeps tier decisions
//! scriptable in tests.

use crate::types::Detection;

/// Source of charset guesses.
pub trait CharsetDetector: Send + Sync {
    /// Guess the encoding of `bytes`.
    fn detect(&self, bytes: &[u8]) -> Detection;
}

/// Detector backed by the `chardet` crate (a port of the universal charset
/// detector).
#[derive(Debug, Clone, Copy, Default)]
pub struct ChardetDetector;

impl CharsetDetector for ChardetDetector {
    fn detect(&self, bytes: &[u8]) -> Detection {
        let (charset, confidence, _language) = chardet::detect(&bytes.to_vec());
        Detection::new(charset, confidence)
    }
}

impl<F> CharsetDetector for F
where
    F: Fn(&[u8]) -> Detection + Send + Sync,
{
    fn detect(&self, bytes: &[u8]) -> Detection {
        self(bytes)
    }
}
