//! HTTP request handlers.

pub(crate) mod files;
mod listing;
mod range;

use percent_encoding::percent_decode_str;

use mdserve_vfs::{FsError, FsErrorKind};

/// Decode a request path into a filesystem path.
///
/// The result always starts with `/`.
pub(crate) fn decode_path(raw: &str) -> Result<String, FsError> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|e| FsError::new(FsErrorKind::InvalidPath).with_path(raw).with_source(e))?;

    if decoded.starts_with('/') {
        Ok(decoded.into_owned())
    } else {
        Ok(format!("/{decoded}"))
    }
}
