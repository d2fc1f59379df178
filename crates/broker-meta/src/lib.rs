//! Credential data model and service key parsers for the auth broker.
//!
//! Service keys arrive in several JSON shapes; [`parse_service_key`] sniffs
//! the shape and normalizes it into one canonical [`ServiceKey`]. Sessions
//! carry the token-bearing state and define the merge rule every session
//! store applies.

pub mod error;
pub mod namespace;
pub mod parser;
pub mod schema;

pub use error::{Error, Result};
pub use namespace::{KeyNamespace, SessionField};
pub use parser::{
    AbapServiceKeyParser, ServiceKeyFormat, ServiceKeyParser, XsuaaServiceKeyParser,
    parse_service_key,
};
pub use schema::{
    AbapSection, AuthType, AuthorizationConfig, ConnectionConfig, DestinationCredentials,
    ServiceKey, Session, UaaCredentials,
};
