//! Constants for credential file naming and discovery.

/// Environment variable holding extra search directories, separated by `:` or `;`.
pub const PATH_ENV_VAR: &str = "AUTH_BROKER_PATH";

/// The two on-disk artifact classes kept per destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Static service key, `{destination}.json`
    ServiceKey,
    /// Token-bearing session, `{destination}.env`
    Session,
}

impl FileKind {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::ServiceKey => "json",
            Self::Session => "env",
        }
    }

    /// File name holding this artifact for `destination`.
    pub fn file_name(&self, destination: &str) -> String {
        format!("{destination}.{}", self.extension())
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceKey => write!(f, "service key"),
            Self::Session => write!(f, "session"),
        }
    }
}
