//! Serve configuration
//!
//! A [`ServeConfig`] is built once per mount and shared read-only by every
//! request. All validation happens in [`ServeConfigBuilder::build`].

use crate::filter::MountPrefix;
use crate::path::normalize;
use crate::response::FileStat;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use pathserve_core::config::{MountConfig, PublicPath};
use pathserve_core::{Error, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Callback invoked with the final file path and its metadata before the
/// default headers are filled in
pub type HeaderCustomizer = Arc<dyn Fn(&mut HeaderMap, &Path, &FileStat) + Send + Sync>;

/// Immutable configuration for one static file mount
#[derive(Clone)]
pub struct ServeConfig {
    root: PathBuf,
    mount_prefix: MountPrefix,
    index_file: Option<String>,
    allow_hidden: bool,
    allow_directory_index: bool,
    allow_gzip_negotiation: bool,
    fallback_extensions: Option<Vec<String>>,
    max_age_millis: u64,
    header_customizer: Option<HeaderCustomizer>,
}

impl ServeConfig {
    /// Start building a configuration for the given root directory
    pub fn builder(root: impl Into<PathBuf>) -> ServeConfigBuilder {
        ServeConfigBuilder::new(root)
    }

    /// Build a configuration from a mount in the configuration file
    pub fn from_mount(mount: &MountConfig) -> Result<Self> {
        let mount_prefix = match &mount.public_path {
            PublicPath::Literal(prefix) => MountPrefix::literal(prefix.as_str()),
            PublicPath::Pattern { regex } => MountPrefix::pattern(regex)?,
        };

        let mut builder = ServeConfig::builder(&mount.root)
            .mount_prefix(mount_prefix)
            .allow_hidden(mount.hidden)
            .directory_index(mount.format)
            .gzip(mount.gzip)
            .max_age_millis(mount.maxage);

        builder = match mount.index.name() {
            Some(index) => builder.index_file(index),
            None => builder.no_index_file(),
        };

        if let Some(extensions) = mount.extensions.list() {
            builder = builder.extensions(extensions.iter().cloned());
        }

        if !mount.headers.is_empty() {
            let mut fixed = Vec::with_capacity(mount.headers.len());
            for (name, value) in &mount.headers {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| Error::Config(format!("invalid header name {:?}: {}", name, e)))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|e| Error::Config(format!("invalid value for header {}: {}", name, e)))?;
                fixed.push((name, value));
            }
            builder = builder.header_customizer(move |headers, _, _| {
                for (name, value) in &fixed {
                    headers.insert(name.clone(), value.clone());
                }
            });
        }

        builder.build()
    }

    /// Absolute, normalized root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mount_prefix(&self) -> &MountPrefix {
        &self.mount_prefix
    }

    pub fn index_file(&self) -> Option<&str> {
        self.index_file.as_deref()
    }

    pub fn allow_hidden(&self) -> bool {
        self.allow_hidden
    }

    pub fn allow_directory_index(&self) -> bool {
        self.allow_directory_index
    }

    pub fn allow_gzip_negotiation(&self) -> bool {
        self.allow_gzip_negotiation
    }

    /// Fallback extensions, each with a leading dot
    pub fn fallback_extensions(&self) -> Option<&[String]> {
        self.fallback_extensions.as_deref()
    }

    pub fn max_age_millis(&self) -> u64 {
        self.max_age_millis
    }

    pub fn header_customizer(&self) -> Option<&HeaderCustomizer> {
        self.header_customizer.as_ref()
    }
}

impl std::fmt::Debug for ServeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServeConfig")
            .field("root", &self.root)
            .field("mount_prefix", &self.mount_prefix)
            .field("index_file", &self.index_file)
            .field("allow_hidden", &self.allow_hidden)
            .field("allow_directory_index", &self.allow_directory_index)
            .field("allow_gzip_negotiation", &self.allow_gzip_negotiation)
            .field("fallback_extensions", &self.fallback_extensions)
            .field("max_age_millis", &self.max_age_millis)
            .field("header_customizer", &self.header_customizer.is_some())
            .finish()
    }
}

/// Builder for [`ServeConfig`]
pub struct ServeConfigBuilder {
    root: PathBuf,
    mount_prefix: MountPrefix,
    index_file: Option<String>,
    allow_hidden: bool,
    allow_directory_index: bool,
    allow_gzip_negotiation: bool,
    fallback_extensions: Option<Vec<String>>,
    max_age_millis: u64,
    header_customizer: Option<HeaderCustomizer>,
}

impl ServeConfigBuilder {
    fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mount_prefix: MountPrefix::default(),
            index_file: Some(pathserve_core::config::DEFAULT_INDEX.to_string()),
            allow_hidden: false,
            allow_directory_index: true,
            allow_gzip_negotiation: false,
            fallback_extensions: None,
            max_age_millis: 0,
            header_customizer: None,
        }
    }

    pub fn mount_prefix(mut self, prefix: MountPrefix) -> Self {
        self.mount_prefix = prefix;
        self
    }

    pub fn index_file(mut self, name: impl Into<String>) -> Self {
        self.index_file = Some(name.into());
        self
    }

    pub fn no_index_file(mut self) -> Self {
        self.index_file = None;
        self
    }

    pub fn allow_hidden(mut self, allow: bool) -> Self {
        self.allow_hidden = allow;
        self
    }

    /// Serve the index file when a directory is requested
    pub fn directory_index(mut self, enable: bool) -> Self {
        self.allow_directory_index = enable;
        self
    }

    /// Serve `<file>.gz` to clients that prefer gzip
    pub fn gzip(mut self, enable: bool) -> Self {
        self.allow_gzip_negotiation = enable;
        self
    }

    /// Extensions tried, in order, for extension-less paths
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback_extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    pub fn max_age_millis(mut self, millis: u64) -> Self {
        self.max_age_millis = millis;
        self
    }

    pub fn header_customizer<F>(mut self, customizer: F) -> Self
    where
        F: Fn(&mut HeaderMap, &Path, &FileStat) + Send + Sync + 'static,
    {
        self.header_customizer = Some(Arc::new(customizer));
        self
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> Result<ServeConfig> {
        if self.root.as_os_str().is_empty() {
            return Err(Error::Config("root directory is required to serve files".to_string()));
        }
        let root = normalize(&std::path::absolute(&self.root)?);

        let index_file = match self.index_file {
            Some(name) if name.is_empty() => None,
            Some(name) => {
                validate_index(&name)?;
                Some(name)
            }
            None => None,
        };

        let fallback_extensions = match self.fallback_extensions {
            Some(list) => Some(
                list.into_iter()
                    .map(normalize_extension)
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };

        tracing::debug!(
            "📁 Static root {} (prefix {:?}, index {:?})",
            root.display(),
            self.mount_prefix,
            index_file
        );

        Ok(ServeConfig {
            root,
            mount_prefix: self.mount_prefix,
            index_file,
            allow_hidden: self.allow_hidden,
            allow_directory_index: self.allow_directory_index,
            allow_gzip_negotiation: self.allow_gzip_negotiation,
            fallback_extensions,
            max_age_millis: self.max_age_millis,
            header_customizer: self.header_customizer,
        })
    }
}

/// The index file is joined onto resolved directories, so it must stay relative.
fn validate_index(name: &str) -> Result<()> {
    let relative = Path::new(name)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if relative {
        Ok(())
    } else {
        Err(Error::Config(format!("index file must be a relative path: {:?}", name)))
    }
}

fn normalize_extension(ext: String) -> Result<String> {
    let bare = ext.strip_prefix('.').unwrap_or(&ext);
    if bare.is_empty() || bare.contains('/') {
        return Err(Error::Config(format!(
            "extensions must be non-empty file suffixes, got {:?}",
            ext
        )));
    }
    Ok(format!(".{}", bare))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathserve_core::config::{Extensions, IndexFile};

    #[test]
    fn test_defaults() {
        let config = ServeConfig::builder("public").build().unwrap();
        assert!(config.root().is_absolute());
        assert!(config.root().ends_with("public"));
        assert_eq!(config.index_file(), Some("index.html"));
        assert!(!config.allow_hidden());
        assert!(config.allow_directory_index());
        assert!(!config.allow_gzip_negotiation());
        assert_eq!(config.fallback_extensions(), None);
        assert_eq!(config.max_age_millis(), 0);
        assert!(config.header_customizer().is_none());
    }

    #[test]
    fn test_root_required() {
        let err = ServeConfig::builder("").build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_root_normalized_once() {
        let config = ServeConfig::builder("/srv/www/./assets/../public").build().unwrap();
        assert_eq!(config.root(), Path::new("/srv/www/public"));
    }

    #[test]
    fn test_extensions_normalized() {
        let config = ServeConfig::builder("/srv")
            .extensions(["html", ".txt"])
            .build()
            .unwrap();
        assert_eq!(
            config.fallback_extensions(),
            Some(&[".html".to_string(), ".txt".to_string()][..])
        );
    }

    #[test]
    fn test_empty_extension_rejected() {
        assert!(ServeConfig::builder("/srv").extensions([""]).build().is_err());
        assert!(ServeConfig::builder("/srv").extensions(["."]).build().is_err());
    }

    #[test]
    fn test_index_must_stay_relative() {
        assert!(ServeConfig::builder("/srv").index_file("../secret").build().is_err());
        assert!(ServeConfig::builder("/srv").index_file("/etc/passwd").build().is_err());
        let config = ServeConfig::builder("/srv").index_file("").build().unwrap();
        assert_eq!(config.index_file(), None);
    }

    #[test]
    fn test_from_mount() {
        let mut mount = MountConfig::new("/srv/site");
        mount.public_path = PublicPath::Literal("static".to_string());
        mount.index = IndexFile::Toggle(false);
        mount.extensions = Extensions::List(vec!["html".to_string()]);
        mount.gzip = true;
        mount.maxage = 5000;
        mount
            .headers
            .insert("X-Served-By".to_string(), "pathserve".to_string());

        let config = ServeConfig::from_mount(&mount).unwrap();
        assert_eq!(config.root(), Path::new("/srv/site"));
        assert!(matches!(config.mount_prefix(), MountPrefix::Literal(p) if p == "/static"));
        assert_eq!(config.index_file(), None);
        assert_eq!(config.fallback_extensions(), Some(&[".html".to_string()][..]));
        assert!(config.allow_gzip_negotiation());
        assert_eq!(config.max_age_millis(), 5000);

        let customizer = config.header_customizer().unwrap();
        let mut headers = HeaderMap::new();
        let stat = FileStat {
            size: 0,
            modified: None,
            is_dir: false,
        };
        customizer(&mut headers, Path::new("/srv/site/a.txt"), &stat);
        assert_eq!(headers.get("x-served-by").unwrap(), "pathserve");
    }

    #[test]
    fn test_from_mount_rejects_bad_pattern_and_headers() {
        let mut mount = MountConfig::new("/srv/site");
        mount.public_path = PublicPath::Pattern {
            regex: "(unclosed".to_string(),
        };
        assert!(ServeConfig::from_mount(&mount).is_err());

        let mut mount = MountConfig::new("/srv/site");
        mount
            .headers
            .insert("bad header".to_string(), "x".to_string());
        assert!(ServeConfig::from_mount(&mount).is_err());
    }
}
