//! Filesystem layer for the auth broker credential stores
//!
//! Provides normalized paths, multi-directory lookup and crash-safe I/O.

pub mod constants;
pub mod error;
pub mod io;
pub mod path;
pub mod resolver;

pub use constants::{FileKind, PATH_ENV_VAR};
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::{NormalizedPath, validate_path_identifier};
pub use resolver::PathResolver;
