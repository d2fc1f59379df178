//! Error types for broker-core

/// Result type for broker-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in broker-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request cannot produce a valid session for this destination
    #[error("Invalid configuration for destination '{destination}': {message}")]
    InvalidConfig {
        destination: String,
        message: String,
    },

    /// The update carries a field the store's destination kind cannot hold
    #[error("Destination '{destination}': {store} session store cannot hold {field}")]
    KindMismatch {
        destination: String,
        store: String,
        field: String,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from broker-fs
    #[error(transparent)]
    Fs(#[from] broker_fs::Error),

    /// Codec error from broker-content
    #[error(transparent)]
    Content(#[from] broker_content::Error),

    /// Service key error from broker-meta
    #[error(transparent)]
    Meta(#[from] broker_meta::Error),
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A backing file vanished between lookup and read
    FileNotFound,
    /// Malformed JSON or env text
    Parse,
    /// A service key matching no known shape
    FormatMismatch,
    /// A request no session can satisfy; not worth retrying
    InvalidConfig,
    /// Write, rename, lock or mkdir failure
    Storage,
}

impl Error {
    pub fn invalid_config(destination: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            destination: destination.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig { .. } | Self::KindMismatch { .. } => ErrorKind::InvalidConfig,
            Self::Fs(e) => fs_kind(e),
            Self::Content(e) => match e {
                broker_content::Error::Parse { .. } => ErrorKind::Parse,
                broker_content::Error::UnsupportedValue { .. } => ErrorKind::InvalidConfig,
                broker_content::Error::Fs(e) => fs_kind(e),
            },
            Self::Meta(e) => match e {
                broker_meta::Error::FormatMismatch { .. } | broker_meta::Error::NotAnObject { .. } => {
                    ErrorKind::FormatMismatch
                }
                broker_meta::Error::MissingFields { .. } => ErrorKind::Parse,
            },
        }
    }
}

fn fs_kind(error: &broker_fs::Error) -> ErrorKind {
    match error {
        broker_fs::Error::InvalidIdentifier { .. } => ErrorKind::InvalidConfig,
        e if e.is_not_found() => ErrorKind::FileNotFound,
        _ => ErrorKind::Storage,
    }
}
