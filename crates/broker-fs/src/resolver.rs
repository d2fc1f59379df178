//! Ordered multi-directory lookup for credential files
//!
//! Search directories come from three sources, highest priority first:
//!
//! 1. Explicit directories handed to the constructor
//! 2. The `AUTH_BROKER_PATH` environment variable (`:`/`;` separated)
//! 3. The current working directory, only when neither source yields a path
//!
//! Reads scan the list in order and take the first existing file. Writes
//! always target the first directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::constants::PATH_ENV_VAR;
use crate::{Error, NormalizedPath, Result, io};

/// Resolves credential files across an ordered, deduplicated directory list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    dirs: Vec<NormalizedPath>,
}

impl PathResolver {
    /// Build a resolver from explicit directories, the override variable and the cwd.
    pub fn new<I, P>(explicit: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        let env_value = std::env::var(PATH_ENV_VAR).ok();
        Ok(Self::from_sources(explicit, env_value.as_deref(), &cwd))
    }

    /// Build a resolver that only consults the override variable and the cwd.
    pub fn from_env() -> Result<Self> {
        Self::new(std::iter::empty::<&Path>())
    }

    /// Build a resolver from already-gathered sources without touching the process environment.
    pub fn from_sources<I, P>(explicit: I, env_value: Option<&str>, cwd: &Path) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut dirs: Vec<NormalizedPath> = Vec::new();

        for path in explicit {
            push_unique(&mut dirs, path.as_ref(), cwd);
        }

        if let Some(value) = env_value {
            for entry in split_path_list(value) {
                push_unique(&mut dirs, Path::new(entry), cwd);
            }
        }

        if dirs.is_empty() {
            tracing::debug!(cwd = %cwd.display(), "No configured search paths, falling back to cwd");
            push_unique(&mut dirs, cwd, cwd);
        }

        // An empty cwd is the only way to still have nothing here.
        if dirs.is_empty() {
            dirs.push(NormalizedPath::new("."));
        }

        tracing::debug!(dirs = ?dirs, "Resolved search directories");
        Self { dirs }
    }

    /// Search directories, highest priority first.
    pub fn search_dirs(&self) -> &[NormalizedPath] {
        &self.dirs
    }

    /// Directory that receives all writes.
    pub fn write_dir(&self) -> &NormalizedPath {
        &self.dirs[0]
    }

    /// Locate `file_name` in the first search directory that contains it.
    pub fn find_file(&self, file_name: &str) -> Option<NormalizedPath> {
        let found = self
            .dirs
            .iter()
            .map(|dir| dir.join(file_name))
            .find(NormalizedPath::is_file);

        match &found {
            Some(path) => tracing::debug!(%path, "Found file"),
            None => tracing::debug!(file_name, "File not found in any search directory"),
        }
        found
    }

    /// Every existing copy of `file_name`, highest priority first.
    pub fn find_all(&self, file_name: &str) -> Vec<NormalizedPath> {
        self.dirs
            .iter()
            .map(|dir| dir.join(file_name))
            .filter(NormalizedPath::is_file)
            .collect()
    }

    /// Path `file_name` would be written to.
    pub fn write_path(&self, file_name: &str) -> NormalizedPath {
        self.write_dir().join(file_name)
    }

    /// Create the write directory if needed and return it.
    pub fn ensure_write_dir(&self) -> Result<&NormalizedPath> {
        let dir = self.write_dir();
        io::ensure_dir(dir)?;
        Ok(dir)
    }

    /// Sorted, unique stems of files with `extension` across all search directories.
    ///
    /// Missing directories are skipped.
    pub fn list_stems(&self, extension: &str) -> Result<Vec<String>> {
        let mut stems = BTreeSet::new();

        for dir in &self.dirs {
            let native = dir.to_native();
            let entries = match fs::read_dir(&native) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(Error::io(native, e)),
            };

            for entry in entries.flatten() {
                let path = NormalizedPath::new(entry.path());
                if path.extension() == Some(extension) && path.is_file() {
                    if let Some(stem) = path.file_stem() {
                        stems.insert(stem.to_string());
                    }
                }
            }
        }

        Ok(stems.into_iter().collect())
    }
}

/// Split an override-variable value into its entries.
///
/// Windows paths carry drive letters, so only `;` separates entries there.
pub fn split_path_list(value: &str) -> impl Iterator<Item = &str> {
    let separators: &[char] = if cfg!(windows) { &[';'] } else { &[':', ';'] };
    value
        .split(separators)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

fn push_unique(dirs: &mut Vec<NormalizedPath>, raw: &Path, cwd: &Path) {
    if raw.as_os_str().is_empty() {
        return;
    }
    let dir = absolutize(raw, cwd);
    if !dirs.contains(&dir) {
        dirs.push(dir);
    }
}

fn absolutize(raw: &Path, cwd: &Path) -> NormalizedPath {
    let joined = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        cwd.join(raw)
    };
    NormalizedPath::new(dunce::simplified(&joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn split_accepts_both_separators() {
        let entries: Vec<_> = split_path_list("/a:/b; /c ::").collect();
        assert_eq!(entries, vec!["/a", "/b", "/c"]);
    }

    #[cfg(not(windows))]
    #[test]
    fn absolutize_resolves_relative_against_cwd() {
        let dir = absolutize(Path::new("keys/../sessions"), Path::new("/work"));
        assert_eq!(dir.as_str(), "/work/sessions");
    }
}
