//! Credential stores for the auth broker
//!
//! Two artifact classes are kept per destination:
//!
//! - a service key, `{destination}.json`, read through [`ServiceKeyStore`]
//! - a session, `{destination}.env` or an in-memory record, read and
//!   updated through [`SessionStore`]
//!
//! File-backed stores locate their files with a
//! [`PathResolver`](broker_fs::PathResolver).

pub mod backend;
pub mod error;
pub mod policy;
pub mod service_key_store;
pub mod session_store;

pub use backend::{EnvFileBackend, MemoryBackend, SessionBackend};
pub use error::{Error, ErrorKind, Result};
pub use policy::{DestinationKind, SessionPolicy};
pub use service_key_store::{JsonServiceKeyStore, ServiceKeyStore};
pub use session_store::{FileSessionStore, PolicySessionStore, SafeSessionStore, SessionStore};

// Re-export the types callers need alongside the stores
pub use broker_fs::{PathResolver, RobustnessConfig};
pub use broker_meta::{
    AuthType, AuthorizationConfig, ConnectionConfig, DestinationCredentials, KeyNamespace,
    ServiceKey, Session,
};
