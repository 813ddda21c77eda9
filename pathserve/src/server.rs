//! HTTP server
//!
//! Chains every configured mount through `StaticFiles::serve`; a request no
//! mount serves falls through to a plain 404.

use futures::future::BoxFuture;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use pathserve_core::config::PathserveConfig;
use pathserve_core::{Error, Result};
use pathserve_static::{Body, ServeConfig, StaticFiles, full_body};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Build one middleware per configured mount, in order
pub fn build_mounts(config: &PathserveConfig) -> Result<Vec<StaticFiles>> {
    if config.mounts.is_empty() {
        return Err(Error::Config("at least one mount is required".to_string()));
    }
    config
        .mounts
        .iter()
        .map(|mount| ServeConfig::from_mount(mount).map(StaticFiles::new))
        .collect()
}

/// Parse a listen address, accepting the `:8080` shorthand
pub fn parse_listen(listen: &str) -> Result<SocketAddr> {
    let full = if listen.starts_with(':') {
        format!("0.0.0.0{}", listen)
    } else {
        listen.to_string()
    };
    full.parse()
        .map_err(|e| Error::Config(format!("invalid listen address {:?}: {}", listen, e)))
}

/// Accept connections until the process is stopped
pub async fn run(addr: SocketAddr, mounts: Vec<StaticFiles>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("🚀 Pathserve listening on http://{}", addr);

    let mounts = Arc::new(mounts);
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Accept error: {}", e);
                continue;
            }
        };

        let io = TokioIo::new(stream);
        let mounts = mounts.clone();

        tokio::task::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .serve_connection(io, service_fn(move |req| handle_request(req, mounts.clone())))
                .await
            {
                tracing::error!("Error serving connection from {}: {:?}", peer, err);
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
    mounts: Arc<Vec<StaticFiles>>,
) -> std::result::Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let response = dispatch(&mounts, req).await;
    tracing::info!("{} {} -> {}", method, path, response.status().as_u16());
    Ok(response)
}

/// Offer the request to each mount in turn
fn dispatch<'a>(mounts: &'a [StaticFiles], req: Request<Incoming>) -> BoxFuture<'a, Response<Body>> {
    Box::pin(async move {
        let Some((mount, rest)) = mounts.split_first() else {
            return not_found();
        };
        match mount.serve(req, |req| dispatch(rest, req)).await {
            Ok(response) => response,
            Err(err) => {
                if err.status().is_server_error() {
                    tracing::error!("❌ {}", err);
                } else {
                    tracing::debug!("{}", err);
                }
                err.into_response()
            }
        }
    })
}

fn not_found() -> Response<Body> {
    let mut response = Response::new(full_body("Not Found"));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}
