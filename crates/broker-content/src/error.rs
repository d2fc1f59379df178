//! Error types for broker-content

/// Result type for broker-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in broker-content operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse {format} content from {source_name}: {message}")]
    Parse {
        format: String,
        source_name: String,
        message: String,
    },

    #[error("Cannot store value for {key}: {reason}")]
    UnsupportedValue { key: String, reason: String },

    #[error(transparent)]
    Fs(#[from] broker_fs::Error),
}

impl Error {
    pub fn parse(
        format: impl Into<String>,
        source_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            format: format.into(),
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}
