//! Request filter
//!
//! Decides whether a request belongs to a mount and computes the path
//! fragment handed to the resolver.

use http::Method;
use pathserve_core::{Error, Result};
use regex::Regex;

/// URL prefix a mount answers for
#[derive(Debug, Clone)]
pub enum MountPrefix {
    /// Segment-matched literal prefix, always starting with `/`
    Literal(String),
    /// Regular expression matched against the raw path
    Pattern(Regex),
}

impl MountPrefix {
    /// Literal prefix, coerced to start with `/`
    pub fn literal(prefix: &str) -> Self {
        if prefix.starts_with('/') {
            MountPrefix::Literal(prefix.to_string())
        } else {
            MountPrefix::Literal(format!("/{}", prefix))
        }
    }

    /// Compile a regex prefix
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(MountPrefix::Pattern)
            .map_err(|e| Error::Config(format!("invalid public path pattern {:?}: {}", pattern, e)))
    }

    /// Check whether a raw request path falls under this prefix
    ///
    /// Literal prefixes compare segment by segment; empty prefix segments
    /// match anything, and runs of `/` in the request path count as one.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            MountPrefix::Pattern(re) => re.is_match(path),
            MountPrefix::Literal(prefix) => {
                let segments = path_segments(path);
                prefix
                    .split('/')
                    .enumerate()
                    .all(|(i, seg)| seg.is_empty() || segments.get(i) == Some(&seg))
            }
        }
    }

    /// Remove the prefix from a path, keeping the result rooted at `/`
    pub fn strip(&self, path: &str) -> String {
        let stripped = match self {
            MountPrefix::Pattern(re) => re.replace(path, "").into_owned(),
            MountPrefix::Literal(prefix) => path.replacen(prefix.as_str(), "", 1),
        };
        if stripped.starts_with('/') {
            stripped
        } else {
            format!("/{}", stripped)
        }
    }
}

impl Default for MountPrefix {
    fn default() -> Self {
        MountPrefix::Literal("/".to_string())
    }
}

/// Split on runs of `/`, keeping a leading and trailing empty segment
fn path_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    if path.starts_with('/') {
        segments.push("");
    }
    segments.extend(path.split('/').filter(|s| !s.is_empty()));
    if path.ends_with('/') {
        segments.push("");
    }
    segments
}

/// Return the fragment to resolve, or `None` when the request is out of scope
pub fn filter_request(method: &Method, path: &str, prefix: &MountPrefix) -> Option<String> {
    if method != Method::GET && method != Method::HEAD {
        return None;
    }
    if !prefix.matches(path) {
        return None;
    }
    Some(prefix.strip(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_methods_only() {
        let prefix = MountPrefix::default();
        assert_eq!(filter_request(&Method::GET, "/1.txt", &prefix), Some("/1.txt".to_string()));
        assert_eq!(filter_request(&Method::HEAD, "/1.txt", &prefix), Some("/1.txt".to_string()));
        assert_eq!(filter_request(&Method::POST, "/1.txt", &prefix), None);
        assert_eq!(filter_request(&Method::DELETE, "/1.txt", &prefix), None);

        let lowercase = Method::from_bytes(b"get").unwrap();
        assert_eq!(filter_request(&lowercase, "/1.txt", &prefix), None);
    }

    #[test]
    fn test_literal_prefix() {
        let prefix = MountPrefix::literal("/static");
        assert!(prefix.matches("/static/1.txt"));
        assert!(prefix.matches("/static"));
        assert!(prefix.matches("//static//1.txt"));
        assert!(!prefix.matches("/1.txt"));
        assert!(!prefix.matches("/staticfiles/1.txt"));

        assert_eq!(
            filter_request(&Method::GET, "/static/1.txt", &prefix),
            Some("/1.txt".to_string())
        );
        assert_eq!(filter_request(&Method::GET, "/static", &prefix), Some("/".to_string()));
        assert_eq!(filter_request(&Method::GET, "/1.txt", &prefix), None);
    }

    #[test]
    fn test_literal_prefix_coerced() {
        let prefix = MountPrefix::literal("assets/img");
        assert!(matches!(&prefix, MountPrefix::Literal(p) if p == "/assets/img"));
        assert!(prefix.matches("/assets/img/logo.png"));
        assert!(!prefix.matches("/assets/css/site.css"));
        assert_eq!(prefix.strip("/assets/img/logo.png"), "/logo.png");
    }

    #[test]
    fn test_root_prefix_keeps_path() {
        let prefix = MountPrefix::default();
        assert!(prefix.matches("/"));
        assert!(prefix.matches("/a/b/c.txt"));
        assert_eq!(prefix.strip("/a/b/c.txt"), "/a/b/c.txt");
        assert_eq!(prefix.strip("/"), "/");
    }

    #[test]
    fn test_pattern_prefix() {
        let prefix = MountPrefix::pattern("^/v[0-9]+").unwrap();
        assert!(prefix.matches("/v2/app.js"));
        assert!(!prefix.matches("/app.js"));
        assert_eq!(
            filter_request(&Method::GET, "/v12/app.js", &prefix),
            Some("/app.js".to_string())
        );
        assert_eq!(prefix.strip("/v1"), "/");
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(MountPrefix::pattern("[").is_err());
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(path_segments("/"), vec!["", ""]);
        assert_eq!(path_segments("//a///b/"), vec!["", "a", "b", ""]);
        assert_eq!(path_segments("/a/b"), vec!["", "a", "b"]);
    }
}
