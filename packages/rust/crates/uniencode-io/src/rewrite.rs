//! Atomic in-place file replacement.
//!
//! Content is streamed into a temporary file next to the original, flushed,
//! fsynced and renamed over the original. Until the rename the original is
//! untouched; after it the new content is complete. Any failure before the
//! rename drops the temporary file, which deletes it.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::IoError;

/// Replace `path` with whatever `write_content` writes, or leave it intact.
///
/// The closure receives a buffered writer backed by a temporary file in the
/// same directory as `path` (so the final rename never crosses filesystems).
/// If the closure returns `Err`, or flushing, syncing or renaming fails, the
/// temporary file is removed and the original keeps its bytes. The original's
/// permission bits are carried over to the replacement.
///
/// Returns whatever the closure returned on success.
///
/// # Errors
/// Returns the closure's error unchanged, or an `IoError` (converted into `E`)
/// when the temporary file cannot be created, written or persisted.
///
/// # Example
///
/// ```rust,ignore
/// use std::io::Write;
/// use uniencode_io::{IoError, replace_atomically};
///
/// replace_atomically::<_, IoError, _>(path, |out| {
///     out.write_all(b"new content\n")?;
///     Ok(())
/// })?;
/// ```
pub fn replace_atomically<T, E, F>(path: &Path, write_content: F) -> Result<T, E>
where
    F: FnOnce(&mut dyn Write) -> Result<T, E>,
    E: From<IoError>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("uniencode");

    let permissions = fs::metadata(path).map_err(IoError::from)?.permissions();
    let temp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(IoError::from)?;

    let mut writer = BufWriter::new(temp);
    let sink: &mut dyn Write = &mut writer;
    let value = write_content(sink)?;

    let temp = writer
        .into_inner()
        .map_err(|e| IoError::System(e.into_error()))?;
    temp.as_file().sync_all().map_err(IoError::from)?;
    temp.as_file()
        .set_permissions(permissions)
        .map_err(IoError::from)?;

    let temp_path = temp.path().to_path_buf();
    temp.persist(path).map_err(|e| IoError::Persist {
        path: path.display().to_string(),
        source: e.error,
    })?;
    tracing::debug!(
        from = %temp_path.display(),
        to = %path.display(),
        "replaced file atomically"
    );

    Ok(value)
}
