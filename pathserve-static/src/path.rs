//! Path decoding and root containment

use crate::error::ServeError;
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};

/// Percent-decode a request path fragment
///
/// Fails on escapes that are not followed by two hex digits, on byte
/// sequences that are not UTF-8 and on NUL bytes.
pub(crate) fn decode_path(fragment: &str) -> Result<String, ServeError> {
    let bytes = fragment.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
            if !valid {
                return Err(ServeError::BadRequest(format!("malformed escape in {:?}", fragment)));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let decoded = percent_decode_str(fragment)
        .decode_utf8()
        .map_err(|_| ServeError::BadRequest(format!("invalid UTF-8 in {:?}", fragment)))?;

    if decoded.contains('\0') {
        return Err(ServeError::BadRequest("null byte in path".to_string()));
    }
    Ok(decoded.into_owned())
}

/// Join a decoded relative path onto `root` without ever leaving it
///
/// `..` pops a segment but stops at `root`; root and prefix components are
/// anchored at `root`.
pub(crate) fn safe_join(root: &Path, relative: &str) -> PathBuf {
    let mut stack: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(name) => stack.push(name),
            Component::ParentDir => {
                stack.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    let mut joined = root.to_path_buf();
    joined.extend(stack);
    joined
}

/// Lexically normalize an absolute path
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}

/// Whether any segment below `root` starts with a dot
pub(crate) fn is_hidden(root: &Path, path: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    relative.components().any(|c| match c {
        Component::Normal(name) => name.as_encoded_bytes().first() == Some(&b'.'),
        _ => false,
    })
}

/// Append a raw suffix to the final path component
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Whether the file name carries any dot-separated suffix
pub(crate) fn has_extension(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.as_encoded_bytes().contains(&b'.'))
}
