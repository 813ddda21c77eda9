//! Static file middleware

use crate::config::ServeConfig;
use crate::error::ServeError;
use crate::filter::filter_request;
use crate::resolver::{Resolution, resolve};
use crate::response::Body;
use http::{Method, Request, Response, header};
use std::future::Future;
use std::sync::Arc;

/// Static file middleware for one mount
///
/// Cheap to clone; the configuration is shared.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    config: Arc<ServeConfig>,
}

impl StaticFiles {
    /// Create the middleware from a validated configuration
    pub fn new(config: ServeConfig) -> Self {
        tracing::info!("📁 Serving {} at {:?}", config.root().display(), config.mount_prefix());
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ServeConfig {
        &self.config
    }

    /// Filter and resolve a request without touching a continuation
    pub async fn handle(
        &self,
        method: &Method,
        path: &str,
        accept_encoding: Option<&str>,
    ) -> Result<Resolution, ServeError> {
        let Some(fragment) = filter_request(method, path, self.config.mount_prefix()) else {
            return Ok(Resolution::Declined);
        };
        resolve(&self.config, &fragment, accept_encoding).await
    }

    /// Serve a request, calling `next` only when no file is served
    ///
    /// Errors are returned to the caller and never reach `next`.
    pub async fn serve<B, F, Fut>(&self, req: Request<B>, next: F) -> Result<Response<Body>, ServeError>
    where
        F: FnOnce(Request<B>) -> Fut,
        Fut: Future<Output = Response<Body>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let accept_encoding = req
            .headers()
            .get(header::ACCEPT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        match self.handle(&method, &path, accept_encoding.as_deref()).await? {
            Resolution::Resolved(file) => Ok(file.into_response(method == Method::HEAD)),
            Resolution::Declined => Ok(next(req).await),
        }
    }
}
