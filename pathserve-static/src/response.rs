//! Resolved files and response bodies

use crate::negotiate::Encoding;
use bytes::Bytes;
use futures::TryStreamExt;
use http::{HeaderMap, Response};
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use http_body::Frame;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio_util::io::ReaderStream;

/// Response body produced by the middleware
pub type Body = BoxBody<Bytes, io::Error>;

/// Empty body
pub fn empty_body() -> Body {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed()
}

/// In-memory body
pub fn full_body(data: impl Into<Bytes>) -> Body {
    Full::new(data.into()).map_err(|never| match never {}).boxed()
}

/// Lazily read body over an open file
pub(crate) fn file_body(file: tokio::fs::File) -> Body {
    let stream = ReaderStream::new(file).map_ok(Frame::data);
    BodyExt::boxed(StreamBody::new(stream))
}

/// Snapshot of the metadata used to build headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub is_dir: bool,
}

impl From<&std::fs::Metadata> for FileStat {
    fn from(metadata: &std::fs::Metadata) -> Self {
        Self {
            size: metadata.len(),
            modified: metadata.modified().ok(),
            is_dir: metadata.is_dir(),
        }
    }
}

/// A regular file confirmed to exist below the root
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// Absolute path of the file actually served
    pub path: PathBuf,
    pub stat: FileStat,
    pub encoding: Encoding,
}

/// A file ready to be sent
#[derive(Debug)]
pub struct FileResponse {
    pub target: ResolvedTarget,
    pub headers: HeaderMap,
    pub file: tokio::fs::File,
}

impl FileResponse {
    /// Absolute path of the served file
    pub fn path(&self) -> &Path {
        &self.target.path
    }

    /// Build the 200 response; HEAD keeps the headers and drops the body
    pub fn into_response(self, head: bool) -> Response<Body> {
        let body = if head { empty_body() } else { file_body(self.file) };
        let mut response = Response::new(body);
        *response.headers_mut() = self.headers;
        response
    }
}
