//! Atomic I/O operations with file locking
//!
//! Every write goes to `{file}.tmp` in the target directory and is then
//! renamed over the target, so readers see either the old file or the new
//! one. Writers to the same target are serialized through an advisory lock
//! on `{file}.lock`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Suffix of the temporary file written before the final rename.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Suffix of the sidecar file used for advisory locking.
pub const LOCK_SUFFIX: &str = ".lock";

/// Tuning knobs for atomic writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// How long to keep retrying the advisory lock before giving up.
    pub lock_timeout: Duration,
    /// Whether to fsync the temp file before renaming it into place.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

/// Write content atomically to a file with locking.
///
/// Missing parent directories are created. The rename is the only
/// durability boundary: a crash before it leaves the previous content
/// (or no file) in place.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = path.parent() {
        ensure_dir(&parent)?;
    }

    let lock_path = path.with_suffix(LOCK_SUFFIX).to_native();
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| Error::io(&lock_path, e))?;

    acquire_lock(&lock_file, &native_path, config.lock_timeout)?;

    let result = write_then_rename(path, content, config.enable_fsync);

    FileExt::unlock(&lock_file).map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    result
}

fn acquire_lock(lock_file: &File, target: &Path, timeout: Duration) -> Result<()> {
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(10))
        .with_max_interval(Duration::from_millis(250))
        .with_max_elapsed_time(Some(timeout))
        .build();

    backoff::retry(policy, || {
        lock_file
            .try_lock_exclusive()
            .map_err(backoff::Error::transient)
    })
    .map_err(|_| {
        tracing::warn!(path = %target.display(), ?timeout, "Timed out waiting for file lock");
        Error::LockFailed {
            path: target.to_path_buf(),
        }
    })
}

fn write_then_rename(path: &NormalizedPath, content: &[u8], fsync: bool) -> Result<()> {
    let native_path = path.to_native();
    let temp_path = path.with_suffix(TEMP_SUFFIX).to_native();

    let written = write_temp(&temp_path, content, fsync)
        .and_then(|()| fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e)));

    if written.is_err() {
        // The target is untouched; drop the half-written temp file.
        let _ = fs::remove_file(&temp_path);
    }

    written
}

fn write_temp(temp_path: &Path, content: &[u8], fsync: bool) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    if fsync {
        temp_file
            .sync_all()
            .map_err(|e| Error::io(temp_path, e))?;
    }

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read text content, returning `Ok(None)` when the file does not exist.
pub fn read_text_optional(path: &NormalizedPath) -> Result<Option<String>> {
    match read_text(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write text content to a file atomically with default robustness settings.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes(), RobustnessConfig::default())
}

/// Remove a file, returning whether it existed.
pub fn remove_file_if_exists(path: &NormalizedPath) -> Result<bool> {
    let native_path = path.to_native();
    match fs::remove_file(&native_path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(&native_path, e)),
    }
}

/// Remove a file written by [`write_atomic`] along with its lock sidecar.
///
/// Returns whether the file itself existed.
pub fn remove_atomic(path: &NormalizedPath) -> Result<bool> {
    let removed = remove_file_if_exists(path)?;
    remove_file_if_exists(&path.with_suffix(LOCK_SUFFIX))?;
    Ok(removed)
}

/// Create a directory and its parents.
///
/// Tolerates another process creating the same directory concurrently.
pub fn ensure_dir(path: &NormalizedPath) -> Result<()> {
    let native_path = path.to_native();
    match fs::create_dir_all(&native_path) {
        Ok(()) => Ok(()),
        Err(_) if native_path.is_dir() => Ok(()),
        Err(e) => Err(Error::io(&native_path, e)),
    }
}
