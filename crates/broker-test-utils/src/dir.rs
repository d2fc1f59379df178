//! [`TestDir`] builder for credential store test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use broker_fs::PathResolver;
use serde_json::Value;
use tempfile::TempDir;

/// A temporary credential directory with helpers for seeding service keys
/// and session files and asserting on what the stores wrote.
///
/// # Example
///
/// ```rust,no_run
/// use broker_test_utils::{TestDir, payloads};
///
/// let dir = TestDir::new();
/// dir.write_service_key("TRIAL", &payloads::abap_service_key());
/// let resolver = dir.resolver();
/// dir.assert_file_exists("TRIAL.json");
/// ```
pub struct TestDir {
    temp_dir: TempDir,
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative`, which need not exist.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Create `relative` as a directory and return its path.
    pub fn subdir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Resolver searching only the root directory.
    pub fn resolver(&self) -> PathResolver {
        PathResolver::from_sources([self.root()], None, self.root())
    }

    /// Resolver searching `relative` directories in the given priority order.
    pub fn resolver_for(&self, relative: &[&str]) -> PathResolver {
        let dirs: Vec<PathBuf> = relative.iter().map(|r| self.path(r)).collect();
        PathResolver::from_sources(dirs, None, self.root())
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", path.display()));
    }

    /// Write `{destination}.json` in the root directory.
    pub fn write_service_key(&self, destination: &str, key: &Value) {
        self.write_service_key_in(".", destination, key);
    }

    /// Write `{destination}.json` in the `dir` subdirectory.
    pub fn write_service_key_in(&self, dir: &str, destination: &str, key: &Value) {
        let content = serde_json::to_string_pretty(key).unwrap();
        self.write(&format!("{dir}/{destination}.json"), &content);
    }

    /// Write `{destination}.env` in the root directory from `KEY=VALUE` pairs.
    pub fn write_session(&self, destination: &str, entries: &[(&str, &str)]) {
        self.write_session_in(".", destination, entries);
    }

    /// Write `{destination}.env` in the `dir` subdirectory from `KEY=VALUE` pairs.
    pub fn write_session_in(&self, dir: &str, destination: &str, entries: &[(&str, &str)]) {
        let content: String = entries
            .iter()
            .map(|(key, value)| format!("{key}={value}\n"))
            .collect();
        self.write(&format!("{dir}/{destination}.env"), &content);
    }

    /// Contents of `relative`.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Value of `key` in the env file at `relative`, if the line exists.
    pub fn env_value(&self, relative: &str, key: &str) -> Option<String> {
        let prefix = format!("{key}=");
        self.read(relative)
            .lines()
            .find_map(|line| line.strip_prefix(&prefix).map(str::to_string))
    }

    pub fn assert_file_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    pub fn assert_file_not_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(!path.exists(), "Expected file NOT to exist: {}", path.display());
    }

    /// Assert that the file at `relative` contains `content`.
    pub fn assert_file_contains(&self, relative: &str, content: &str) {
        let file_content = self.read(relative);
        assert!(
            file_content.contains(content),
            "Expected {relative} to contain {content:?}, got:\n{file_content}"
        );
    }

    /// Assert that the file at `relative` does not contain `content`.
    pub fn assert_file_not_contains(&self, relative: &str, content: &str) {
        let file_content = self.read(relative);
        assert!(
            !file_content.contains(content),
            "Expected {relative} NOT to contain {content:?}, got:\n{file_content}"
        );
    }

    /// Leftover `.tmp` files anywhere under the root.
    pub fn temp_files(&self) -> Vec<PathBuf> {
        fn walk(dir: &Path, found: &mut Vec<PathBuf>) {
            let Ok(entries) = fs::read_dir(dir) else {
                return;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, found);
                } else if path.extension().is_some_and(|ext| ext == "tmp") {
                    found.push(path);
                }
            }
        }

        let mut found = Vec::new();
        walk(self.root(), &mut found);
        found
    }
}
