//! File system helpers for the build.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::BuildError;

/// Read a UTF-8 text file.
pub fn read_text(path: &Path) -> Result<String, BuildError> {
    fs::read_to_string(path).map_err(|e| BuildError::io(path, e))
}

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, BuildError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|source| BuildError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a text file, creating parent directories as needed.
pub fn write_text(path: &Path, content: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, content).map_err(|e| BuildError::io(path, e))
}

/// Write pretty-printed JSON with a trailing newline.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), BuildError> {
    let json = serde_json::to_string_pretty(data).map_err(|source| BuildError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_text(path, &format!("{}\n", json))
}

/// Create a directory and its parents.
pub fn ensure_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|e| BuildError::io(path, e))
}

/// Remove a directory tree if it exists.
pub fn remove_dir(path: &Path) -> Result<(), BuildError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| BuildError::io(path, e))?;
    }
    Ok(())
}

/// Recursively copy `src` into `dest`, merging with existing content.
pub fn copy_dir(src: &Path, dest: &Path) -> Result<usize, BuildError> {
    let mut copied = 0;

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            BuildError::io(path, std::io::Error::other(e.to_string()))
        })?;

        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                ensure_dir(parent)?;
            }
            fs::copy(entry.path(), &target).map_err(|e| BuildError::io(entry.path(), e))?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Names of the immediate subdirectories of `path`, sorted.
///
/// An absent or unreadable directory yields an empty list.
pub fn list_dirs(path: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(path) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect();
    names.sort();
    names
}
