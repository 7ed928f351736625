//! Pluggable binary-file sniffers.
//!
//! The walker asks a [`BinarySniffer`] before handing a file to the engine.
//! [`ContentSniffer`] inspects bytes in-process; [`FileCommandSniffer`] asks
//! the `file(1)` utility, matching how the tool historically decided.

use std::path::Path;

use crate::detect::{SNIFF_LEN, is_binary};
use crate::error::IoError;
use crate::sync::read_prefix;

/// Decides whether a file should be skipped as binary.
pub trait BinarySniffer: Send + Sync {
    /// Return `true` when `path` holds binary (non-text) content.
    ///
    /// # Errors
    /// Returns an `IoError` when the file cannot be inspected.
    fn is_binary(&self, path: &Path) -> Result<bool, IoError>;
}

/// Pure-bytes sniffer: NULL bytes or a high control-byte ratio in the first
/// 8KB mark a file as binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentSniffer;

impl BinarySniffer for ContentSniffer {
    fn is_binary(&self, path: &Path) -> Result<bool, IoError> {
        let sample = read_prefix(path, SNIFF_LEN)?;
        Ok(is_binary(&sample))
    }
}

/// Sniffer backed by the `file(1)` utility.
///
/// A file is binary when `file --brief` does not describe it as some kind of
/// text. On Windows there is no `file` utility and every file is reported as
/// text.
#[derive(Debug, Clone)]
pub struct FileCommandSniffer {
    program: String,
}

impl FileCommandSniffer {
    /// Sniffer invoking `file` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("file")
    }

    /// Sniffer invoking a specific executable.
    #[must_use]
    pub fn with_program<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FileCommandSniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl BinarySniffer for FileCommandSniffer {
    #[cfg(windows)]
    fn is_binary(&self, _path: &Path) -> Result<bool, IoError> {
        Ok(false)
    }

    #[cfg(not(windows))]
    fn is_binary(&self, path: &Path) -> Result<bool, IoError> {
        let probe_error = |message: String| IoError::Probe {
            path: path.display().to_string(),
            message,
        };

        let output = std::process::Command::new(&self.program)
            .arg("--brief")
            .arg("--")
            .arg(path)
            .output()
            .map_err(|e| probe_error(format!("cannot run `{}`: {e}", self.program)))?;

        if !output.status.success() {
            return Err(probe_error(format!(
                "`{}` exited with {}",
                self.program, output.status
            )));
        }

        let description = String::from_utf8_lossy(&output.stdout);
        tracing::trace!(path = %path.display(), %description, "file(1) probe");
        Ok(!description.contains("text"))
    }
}
