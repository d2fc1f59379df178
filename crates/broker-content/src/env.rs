//! `KEY=VALUE` session file codec
//!
//! Parsing rules:
//! - blank lines and lines starting with `#` are skipped
//! - an optional `export ` prefix is accepted
//! - values in matching single or double quotes are taken verbatim
//!   (double quotes understand `\"` and `\\`)
//! - unquoted values lose a trailing `# comment` only when whitespace
//!   precedes the `#`, so `https://host/#/app` survives
//! - values never span lines

use broker_fs::{NormalizedPath, RobustnessConfig, io};

use crate::error::{Error, Result};
use crate::format::Format;

/// An ordered set of env entries.
///
/// Keys keep their first-seen position; setting an existing key replaces
/// its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    entries: Vec<(String, String)>,
}

impl EnvFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse env text. `source_name` only appears in error messages.
    pub fn parse(content: &str, source_name: &str) -> Result<Self> {
        let mut file = Self::new();
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        for (idx, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim_start();
            if line.trim_end().is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);

            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::parse(
                    Format::Env.name(),
                    source_name,
                    format!("line {}: expected KEY=VALUE", idx + 1),
                ));
            };

            let key = key.trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(Error::parse(
                    Format::Env.name(),
                    source_name,
                    format!("line {}: invalid key '{key}'", idx + 1),
                ));
            }

            file.set(key, parse_value(value));
        }

        Ok(file)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Overlay `other` onto this file; its keys win.
    pub fn merge(&mut self, other: &EnvFile) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to env text, one entry per line.
    ///
    /// Values containing whitespace, `=`, `#` or quotes are double-quoted
    /// with embedded quotes and backslashes escaped.
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        for (key, value) in &self.entries {
            if value.contains(['\n', '\r']) {
                return Err(Error::UnsupportedValue {
                    key: key.clone(),
                    reason: "multi-line values are not supported".into(),
                });
            }
            if needs_quotes(value) {
                out.push_str(&format!("{key}=\"{}\"\n", escape(value)));
            } else {
                out.push_str(&format!("{key}={value}\n"));
            }
        }
        Ok(out)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvFile {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut file = Self::new();
        for (key, value) in iter {
            file.set(key, value);
        }
        file
    }
}

fn parse_value(raw: &str) -> String {
    let value = raw.trim_start();

    if let Some(quote @ ('"' | '\'')) = value.chars().next() {
        if let Some(end) = closing_quote(value, quote) {
            let inner = &value[1..end];
            return if quote == '"' {
                unescape(inner)
            } else {
                inner.to_string()
            };
        }
    }

    strip_inline_comment(raw).trim().to_string()
}

fn closing_quote(value: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in value.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' && quote == '"' {
            escaped = true;
        } else if c == quote {
            return Some(idx);
        }
    }
    None
}

fn strip_inline_comment(raw: &str) -> &str {
    for (idx, c) in raw.char_indices() {
        if c == '#' && raw[..idx].ends_with(char::is_whitespace) {
            return &raw[..idx];
        }
    }
    raw
}

fn needs_quotes(value: &str) -> bool {
    value.contains([' ', '\t', '=', '#', '"', '\'']) || value.trim() != value
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next @ ('"' | '\\')) = chars.peek() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// How [`EnvCodec::save`] treats the file already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Write exactly the given entries.
    Replace,
    /// Overlay the given entries onto the existing file so keys this
    /// caller does not manage survive.
    PreserveExisting,
}

/// Loads and atomically saves env files.
#[derive(Debug, Default)]
pub struct EnvCodec {
    robustness: RobustnessConfig,
}

impl EnvCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_robustness(robustness: RobustnessConfig) -> Self {
        Self { robustness }
    }

    /// Load an env file, `Ok(None)` when it does not exist.
    pub fn load(&self, path: &NormalizedPath) -> Result<Option<EnvFile>> {
        match io::read_text_optional(path)? {
            Some(content) => Ok(Some(EnvFile::parse(&content, path.as_str())?)),
            None => Ok(None),
        }
    }

    /// Save `values` to `path`, dropping every key listed in `remove` first.
    pub fn save(
        &self,
        path: &NormalizedPath,
        values: &EnvFile,
        remove: &[&str],
        mode: SaveMode,
    ) -> Result<()> {
        let mut file = match mode {
            SaveMode::Replace => EnvFile::new(),
            SaveMode::PreserveExisting => self.load(path)?.unwrap_or_default(),
        };

        for key in remove {
            file.remove(key);
        }
        file.merge(values);

        let content = file.render()?;
        tracing::debug!(%path, entries = file.len(), "Writing env file");
        io::write_atomic(path, content.as_bytes(), self.robustness)?;
        Ok(())
    }
}
