//! Configuration type definitions
//!
//! These types mirror the on-disk configuration file. They are plain data;
//! validation happens when a mount is turned into a runtime serve config.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for Pathserve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathserveConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Mounts, tried in order for every request
    #[serde(default)]
    pub mounts: Vec<MountConfig>,

    /// Global logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for PathserveConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            mounts: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

/// A single static file mount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    /// Directory to serve
    pub root: String,

    /// URL prefix this mount answers for
    #[serde(default)]
    pub public_path: PublicPath,

    /// Index file served for `/`-terminated paths (`false` disables)
    #[serde(default)]
    pub index: IndexFile,

    /// Serve dot-files and dot-directories
    #[serde(default)]
    pub hidden: bool,

    /// Fall back to the index file when a directory is requested
    #[serde(default = "default_true")]
    pub format: bool,

    /// Serve `<file>.gz` siblings to clients accepting gzip
    #[serde(default)]
    pub gzip: bool,

    /// Extensions tried for extension-less paths (`false` disables)
    #[serde(default)]
    pub extensions: Extensions,

    /// Cache-Control max-age in milliseconds
    #[serde(default, alias = "max_age", alias = "maxAge")]
    pub maxage: u64,

    /// Extra response headers set on every served file
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl MountConfig {
    /// Create a mount with default options for the given root
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_path: PublicPath::default(),
            index: IndexFile::default(),
            hidden: false,
            format: true,
            gzip: false,
            extensions: Extensions::default(),
            maxage: 0,
            headers: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Mount prefix: a literal path or a regular expression
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PublicPath {
    /// Literal, segment-matched prefix
    Literal(String),
    /// Regular expression matched against the raw path
    Pattern {
        regex: String,
    },
}

impl Default for PublicPath {
    fn default() -> Self {
        PublicPath::Literal("/".to_string())
    }
}

/// Index file setting, either a file name or a boolean toggle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IndexFile {
    Name(String),
    Toggle(bool),
}

impl IndexFile {
    /// Effective index file name, `None` when disabled
    pub fn name(&self) -> Option<&str> {
        match self {
            IndexFile::Name(name) if !name.is_empty() => Some(name),
            IndexFile::Name(_) => None,
            IndexFile::Toggle(true) => Some(DEFAULT_INDEX),
            IndexFile::Toggle(false) => None,
        }
    }
}

impl Default for IndexFile {
    fn default() -> Self {
        IndexFile::Name(DEFAULT_INDEX.to_string())
    }
}

/// Default index file name
pub const DEFAULT_INDEX: &str = "index.html";

/// Fallback extension list, or a boolean toggle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Extensions {
    List(Vec<String>),
    Toggle(bool),
}

impl Extensions {
    /// Configured extensions, `None` when disabled
    ///
    /// Only an explicit list enables the fallback; `true` alone carries no
    /// extensions to try.
    pub fn list(&self) -> Option<&[String]> {
        match self {
            Extensions::List(list) => Some(list),
            Extensions::Toggle(_) => None,
        }
    }
}

impl Default for Extensions {
    fn default() -> Self {
        Extensions::Toggle(false)
    }
}

/// Global logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
