//! Pathserve Static File Middleware
//!
//! Maps request paths onto a directory and streams files back:
//! - Mount prefix filtering (literal or regex)
//! - Traversal-safe path resolution and hidden file policy
//! - Index, extension and pre-compressed gzip fallbacks
//! - Content-Type, Last-Modified and Cache-Control headers

mod config;
mod error;
mod filter;
mod mime;
mod negotiate;
mod path;
mod resolver;
mod response;
mod serve;

pub use config::{HeaderCustomizer, ServeConfig, ServeConfigBuilder};
pub use error::ServeError;
pub use filter::{MountPrefix, filter_request};
pub use negotiate::{Encoding, preferred_encoding};
pub use resolver::{Resolution, resolve};
pub use response::{Body, FileResponse, FileStat, ResolvedTarget, empty_body, full_body};
pub use serve::StaticFiles;
