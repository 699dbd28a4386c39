//! Atomic artifact writes.
//!
//! Every artifact is written to a temporary file in its destination
//! directory, synced, then renamed over the final path. A failed build never
//! leaves a partially written file behind.

use crate::error::PatcherError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::trace;

/// Write `data` to `path`, replacing any existing file only on success.
///
/// Parent directories are created as needed.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<(), PatcherError> {
    write_atomic_with(path, data, |_| Ok(()))
}

/// Write `data` to a temporary file next to `path`, run `finish` on the
/// temporary path, then rename it over `path`.
///
/// If `finish` fails the temporary file is removed and `path` is untouched.
pub fn write_atomic_with<F>(path: &Path, data: &[u8], finish: F) -> Result<(), PatcherError>
where
    F: FnOnce(&Path) -> Result<(), PatcherError>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| PatcherError::io(parent, e))?;
    temp.write_all(data)
        .map_err(|e| PatcherError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| PatcherError::io(temp.path(), e))?;

    // Close the handle so external tools can rewrite the file
    let temp = temp.into_temp_path();
    let temp_path: &Path = &temp;
    finish(temp_path)?;
    temp.persist(path)
        .map_err(|e| PatcherError::io(path, e.error))?;

    trace!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// Create `dir` and its parents if missing
pub fn ensure_dir(dir: &Path) -> Result<(), PatcherError> {
    fs::create_dir_all(dir).map_err(|e| PatcherError::io(dir, e))
}

/// Read a whole file, attaching the path to any error
pub fn read_file(path: &Path) -> Result<Vec<u8>, PatcherError> {
    fs::read(path).map_err(|e| PatcherError::io(path, e))
}
