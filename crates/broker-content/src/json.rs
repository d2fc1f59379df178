//! JSON service key file handling

use broker_fs::{NormalizedPath, RobustnessConfig, io};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::format::Format;

const CREDENTIALS_KEY: &str = "credentials";

/// Loads and atomically saves JSON documents.
#[derive(Debug, Default)]
pub struct JsonFileHandler {
    robustness: RobustnessConfig,
}

impl JsonFileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_robustness(robustness: RobustnessConfig) -> Self {
        Self { robustness }
    }

    /// Load a JSON document, `Ok(None)` when the file does not exist.
    ///
    /// Banner text around the document is stripped and a lone
    /// `{"credentials": {...}}` wrapper is removed.
    pub fn load(&self, path: &NormalizedPath) -> Result<Option<Value>> {
        match io::read_text_optional(path)? {
            Some(content) => Ok(Some(parse_json(&content, path.as_str())?)),
            None => Ok(None),
        }
    }

    /// Pretty-print `value` with two-space indentation and write it atomically.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let mut content = serde_json::to_string_pretty(value)
            .map_err(|e| Error::parse(Format::Json.name(), path.as_str(), e.to_string()))?;
        content.push('\n');
        io::write_atomic(path, content.as_bytes(), self.robustness)?;
        Ok(())
    }
}

/// Parse JSON text, salvaging a document embedded in surrounding text.
pub fn parse_json(content: &str, source_name: &str) -> Result<Value> {
    let value = match serde_json::from_str::<Value>(content) {
        Ok(value) => value,
        Err(original) => {
            let Some(embedded) = extract_json_object(content) else {
                return Err(Error::parse(
                    Format::Json.name(),
                    source_name,
                    original.to_string(),
                ));
            };
            let value = serde_json::from_str::<Value>(embedded).map_err(|e| {
                Error::parse(Format::Json.name(), source_name, e.to_string())
            })?;
            tracing::warn!(source = source_name, "Recovered JSON document from surrounding text");
            value
        }
    };

    Ok(unwrap_credentials(value))
}

/// Slice from the first `{` to the last `}`, if both exist in that order.
pub fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (start < end).then(|| &content[start..=end])
}

/// Unwrap `{"credentials": {...}}` to the inner object.
///
/// Only a wrapper with no sibling keys is unwrapped.
pub fn unwrap_credentials(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.len() == 1 && map.get(CREDENTIALS_KEY).is_some_and(Value::is_object) =>
        {
            map.remove(CREDENTIALS_KEY).unwrap_or_default()
        }
        other => other,
    }
}
