//! Env and JSON codecs for the auth broker credential stores
//!
//! Both codecs persist through [`broker_fs::io::write_atomic`], so readers
//! never observe a half-written file.

pub mod env;
pub mod error;
pub mod format;
pub mod json;

pub use env::{EnvCodec, EnvFile, SaveMode};
pub use error::{Error, Result};
pub use format::Format;
pub use json::{JsonFileHandler, extract_json_object, parse_json, unwrap_credentials};
