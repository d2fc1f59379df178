//! On-disk credential formats

use serde::{Deserialize, Serialize};

/// Supported credential file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    /// `KEY=VALUE` lines
    Env,
    /// JSON document, possibly wrapped in banner text
    Json,
}

impl Format {
    /// Human-readable name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::Json => "JSON",
        }
    }
}
