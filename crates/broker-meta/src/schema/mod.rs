//! Credential data model

mod connection;
mod service_key;
mod session;

pub use connection::{AuthType, AuthorizationConfig, ConnectionConfig, DestinationCredentials};
pub use service_key::{AbapSection, ServiceKey, UaaCredentials};
pub use session::Session;

/// `Some(s)` only for non-empty strings.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
