//! Per-request errors

use crate::response::{Body, full_body};
use http::{Response, StatusCode, header};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while resolving or opening a file
#[derive(Debug, Error)]
pub enum ServeError {
    /// The request path could not be decoded
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No file after all fallbacks were tried
    #[error("Not found: {}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Unexpected filesystem failure
    #[error("Internal error on {}: {source}", path.display())]
    Internal {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ServeError {
    /// Classify a stat or open failure
    pub(crate) fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound
            | io::ErrorKind::NotADirectory
            | io::ErrorKind::InvalidFilename => ServeError::NotFound { path, source },
            _ => ServeError::Internal { path, source },
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServeError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServeError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text error response carrying only the status reason
    pub fn into_response(self) -> Response<Body> {
        let status = self.status();
        let reason = status.canonical_reason().unwrap_or("Error");
        let mut response = Response::new(full_body(reason));
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}
