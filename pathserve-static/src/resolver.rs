//! File resolution
//!
//! Turns a path fragment into a file response. The steps run in a fixed
//! order and the first decline or error ends resolution:
//! decode, index substitution, safe join, hidden check, gzip sibling,
//! extension fallback, stat, directory index, headers.

use crate::config::ServeConfig;
use crate::error::ServeError;
use crate::mime::content_type;
use crate::negotiate::{Encoding, preferred_encoding};
use crate::path::{decode_path, has_extension, is_hidden, safe_join, with_suffix};
use crate::response::{FileResponse, FileStat, ResolvedTarget};
use http::header::{self, HeaderMap, HeaderValue};
use std::path::Path;

/// Outcome of a resolution that did not fail
#[derive(Debug)]
pub enum Resolution {
    /// Nothing to serve here; the caller should continue its pipeline
    Declined,
    /// A file was found and opened
    Resolved(FileResponse),
}

/// Resolve a path fragment (always starting with `/`) against the config
pub async fn resolve(
    config: &ServeConfig,
    fragment: &str,
    accept_encoding: Option<&str>,
) -> Result<Resolution, ServeError> {
    let trailing_slash = fragment.ends_with('/');
    let relative = fragment.strip_prefix('/').unwrap_or(fragment);

    let mut decoded = decode_path(relative)?;
    if trailing_slash {
        if let Some(index) = config.index_file() {
            decoded.push_str(index);
        }
    }

    let mut path = safe_join(config.root(), &decoded);

    if !config.allow_hidden() && is_hidden(config.root(), &path) {
        tracing::debug!("🙈 Hidden path declined: {}", path.display());
        return Ok(Resolution::Declined);
    }

    let mut headers = HeaderMap::new();
    let mut encoding = Encoding::Identity;

    // Suffixing the root itself would name a sibling outside it
    let below_root = path != config.root();

    if below_root
        && config.allow_gzip_negotiation()
        && preferred_encoding(accept_encoding) == Some(Encoding::Gzip)
    {
        let compressed = with_suffix(&path, ".gz");
        if exists(&compressed).await {
            tracing::debug!("✅ Using pre-compressed file: {}", compressed.display());
            path = compressed;
            encoding = Encoding::Gzip;
            headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        }
    }

    if let Some(extensions) = config.fallback_extensions() {
        if below_root && !has_extension(&path) {
            for ext in extensions {
                let candidate = with_suffix(&path, ext);
                if exists(&candidate).await {
                    path = candidate;
                    break;
                }
            }
        }
    }

    let mut stat = stat_path(&path).await?;

    if stat.is_dir {
        match (config.allow_directory_index(), config.index_file()) {
            (true, Some(index)) => {
                path = path.join(index);
                stat = stat_path(&path).await?;
                if stat.is_dir {
                    return Err(ServeError::NotFound {
                        source: std::io::Error::new(
                            std::io::ErrorKind::IsADirectory,
                            "index file is a directory",
                        ),
                        path,
                    });
                }
            }
            _ => {
                tracing::debug!("📂 Directory without index declined: {}", path.display());
                return Ok(Resolution::Declined);
            }
        }
    }

    if let Some(customize) = config.header_customizer() {
        customize(&mut headers, &path, &stat);
    }
    fill_headers(&mut headers, config, &path, &stat);

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| ServeError::from_io(path.clone(), e))?;

    tracing::debug!("📁 Serving {} ({} bytes, {})", path.display(), stat.size, encoding.as_str());

    Ok(Resolution::Resolved(FileResponse {
        target: ResolvedTarget {
            path,
            stat,
            encoding,
        },
        headers,
        file,
    }))
}

/// Default headers; Last-Modified and Cache-Control yield to the customizer
fn fill_headers(headers: &mut HeaderMap, config: &ServeConfig, path: &Path, stat: &FileStat) {
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(stat.size));

    if !headers.contains_key(header::LAST_MODIFIED) {
        if let Some(modified) = stat.modified {
            if let Ok(value) = HeaderValue::from_str(&httpdate::fmt_http_date(modified)) {
                headers.insert(header::LAST_MODIFIED, value);
            }
        }
    }

    if !headers.contains_key(header::CACHE_CONTROL) {
        let max_age = format!("max-age={}", config.max_age_millis() / 1000);
        if let Ok(value) = HeaderValue::from_str(&max_age) {
            headers.insert(header::CACHE_CONTROL, value);
        }
    }

    if let Ok(value) = HeaderValue::from_str(&content_type(path)) {
        headers.insert(header::CONTENT_TYPE, value);
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

async fn stat_path(path: &Path) -> Result<FileStat, ServeError> {
    tokio::fs::metadata(path)
        .await
        .map(|m| FileStat::from(&m))
        .map_err(|e| ServeError::from_io(path.to_path_buf(), e))
}
