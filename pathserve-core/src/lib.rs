//! Pathserve Core Library
//!
//! Shared error types and the on-disk configuration model used by the
//! static file middleware and the `pathserve` binary.

pub mod config;
pub mod error;

pub use error::{Error, Result};

/// Pathserve version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
