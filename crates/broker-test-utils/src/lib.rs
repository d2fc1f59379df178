//! Shared test utilities for the auth broker workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`dir`]: [`TestDir`] builder for credential directories
//! - [`payloads`]: canned service key documents
//! - [`logging`]: test-friendly tracing setup

pub mod dir;
pub mod logging;
pub mod payloads;

pub use dir::TestDir;
pub use logging::init_tracing;
