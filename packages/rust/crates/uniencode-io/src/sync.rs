//! Synchronous file reads with safety checks.

use std::fs as std_fs;
use std::io::Read;
use std::path::Path;

use crate::error::IoError;

/// Read raw bytes from a regular file with size and link checks.
///
/// Symbolic links are refused rather than followed: rewriting through a link
/// would replace the link itself with a regular file.
///
/// # Arguments
/// * `path` - Path to the file
/// * `max_bytes` - Maximum file size in bytes
///
/// # Errors
/// Returns `IoError::NotFound`, `IoError::Symlink`, `IoError::NotRegularFile`
/// or `IoError::TooLarge` when the path is unsuitable, `IoError::System` when
/// reading fails.
///
/// # Example
///
/// ```rust,ignore
/// use uniencode_io::read_bytes_safe;
///
/// let bytes = read_bytes_safe("subtitles.srt", 64 * 1024 * 1024)?;
/// ```
pub fn read_bytes_safe<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<Vec<u8>, IoError> {
    let path = path.as_ref();
    let metadata = check_regular_file(path)?;

    if metadata.len() > max_bytes {
        return Err(IoError::TooLarge(metadata.len(), max_bytes));
    }

    let mut file = std_fs::File::open(path)?;
    let capacity = usize::try_from(metadata.len()).unwrap_or(0);
    let mut buffer = Vec::with_capacity(capacity);
    file.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Read at most `limit` leading bytes of a file.
///
/// # Errors
/// Returns `IoError::System` when the file cannot be opened or read.
pub fn read_prefix<P: AsRef<Path>>(path: P, limit: usize) -> Result<Vec<u8>, IoError> {
    let file = std_fs::File::open(path.as_ref())?;
    let mut buffer = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Ensure `path` names a regular file that is not a symbolic link.
///
/// # Errors
/// Returns `IoError::NotFound`, `IoError::Symlink` or
/// `IoError::NotRegularFile`.
pub fn check_regular_file(path: &Path) -> Result<std_fs::Metadata, IoError> {
    let metadata = std_fs::symlink_metadata(path)
        .map_err(|_| IoError::NotFound(path.to_string_lossy().to_string()))?;

    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        return Err(IoError::Symlink(path.to_string_lossy().to_string()));
    }
    if !file_type.is_file() {
        return Err(IoError::NotRegularFile(path.to_string_lossy().to_string()));
    }
    Ok(metadata)
}
