//! MIME type handling

use std::path::Path;

/// Content-Type for a served file
///
/// A trailing `.gz` is ignored so pre-compressed siblings report the type of
/// the decompressed content. Textual types carry a UTF-8 charset.
pub fn content_type(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(name);

    let mime = mime_guess::from_path(name)
        .first_raw()
        .unwrap_or("application/octet-stream");

    if needs_charset(mime) {
        format!("{}; charset=utf-8", mime)
    } else {
        mime.to_string()
    }
}

fn needs_charset(mime: &str) -> bool {
    mime.starts_with("text/")
        || matches!(mime, "application/json" | "application/javascript" | "application/xml")
}
