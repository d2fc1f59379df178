//! Error types for broker-meta

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Service key matches no known format; expected {expected}")]
    FormatMismatch { expected: String },

    #[error("{format} service key is missing required fields: {}", .fields.join(", "))]
    MissingFields { format: String, fields: Vec<String> },

    #[error("Service key must be a JSON object, found {found}")]
    NotAnObject { found: String },
}
