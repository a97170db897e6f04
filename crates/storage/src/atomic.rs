//! Atomic read/write of single JSON files, grounded 1:1 on
//! `loom_tools/common/state.py::read_json_file`/`write_json_file`.

use std::fs;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtomicWriteError {
    #[error("creating parent directory {0}: {1}")]
    CreateDir(String, std::io::Error),
    #[error("serializing to json: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("writing temp file: {0}")]
    Write(std::io::Error),
    #[error("persisting temp file over {0}: {1}")]
    Persist(String, std::io::Error),
}

/// Read and deserialize `path` as JSON, returning `T::default()` on a
/// missing file, blank/whitespace-only contents, or invalid JSON — the
/// original never distinguishes "absent" from "corrupt", so neither do we.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let Ok(raw) = fs::read_to_string(path) else {
        return T::default();
    };
    if raw.trim().is_empty() {
        return T::default();
    }
    serde_json::from_str(&raw).unwrap_or_default()
}

/// Serialize `value` as pretty JSON (2-space indent, trailing newline) and
/// write it to `path` atomically: write to a temp file in the same
/// directory, then rename over the destination. The temp file is cleaned
/// up automatically if anything fails before the rename.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), AtomicWriteError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .map_err(|e| AtomicWriteError::CreateDir(parent.display().to_string(), e))?;

    let mut body = serde_json::to_vec_pretty(value)?;
    body.push(b'\n');

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(AtomicWriteError::Write)?;
    use std::io::Write;
    tmp.write_all(&body).map_err(AtomicWriteError::Write)?;
    tmp.flush().map_err(AtomicWriteError::Write)?;

    tmp.persist(path)
        .map_err(|e| AtomicWriteError::Persist(path.display().to_string(), e.error))?;
    Ok(())
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
