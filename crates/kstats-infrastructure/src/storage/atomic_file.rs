//! Atomic file operations.
//!
//! Writes go to a temporary sibling, are fsynced, then renamed over the
//! target, so readers in this or another process only ever see complete
//! files.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

/// Writes `content` to `path` atomically, creating parent directories.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path)?;
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(content)?;

    // Ensure data is written to disk
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp_path, path)
}

/// Reads a file, mapping a missing file to `None`.
pub fn read_if_exists(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Reads a file as text, replacing invalid UTF-8 with U+FFFD. A missing file
/// is `None`.
pub fn read_lossy_if_exists(path: &Path) -> io::Result<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Removes a file, treating "already gone" as success.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory")
    })?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no file name"))?;

    let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
    Ok(parent.join(tmp_name))
}

/// An exclusive cross-process lock guard, released when dropped.
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Blocks until the exclusive lock on `lock_path` is held.
    pub fn acquire(lock_path: &Path) -> io::Result<Self> {
        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)?;

        FileExt::lock_exclusive(&file)?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Best effort; closing the handle releases it anyway.
        let _ = FileExt::unlock(&self.file);
    }
}
