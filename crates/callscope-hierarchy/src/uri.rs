//! Conversion between UTF-8 paths and `file://` URIs.

use camino::{Utf8Path, Utf8PathBuf};
use lsp_types::Uri;
use url::Url;

use crate::error::ServiceError;

/// Converts a `file://` URI to a path.
///
/// # Errors
/// Returns [`ServiceError::Request`] if the URI is not a local file URI with
/// a UTF-8 path.
pub fn uri_to_path(uri: &Uri) -> Result<Utf8PathBuf, ServiceError> {
    let invalid = || ServiceError::request(format!("not a local file URI: {}", uri.as_str()));
    let url = Url::parse(uri.as_str()).map_err(|_| invalid())?;
    let path = url.to_file_path().map_err(|()| invalid())?;
    Utf8PathBuf::try_from(path).map_err(|_| invalid())
}

/// Converts an absolute path to a `file://` URI.
///
/// # Errors
/// Returns [`ServiceError::Request`] if the path is relative or the
/// resulting URI fails to parse.
pub fn path_to_uri(path: &Utf8Path) -> Result<Uri, ServiceError> {
    let url = Url::from_file_path(path.as_std_path())
        .map_err(|()| ServiceError::request(format!("path is not absolute: {path}")))?;
    url.as_str()
        .parse()
        .map_err(|_| ServiceError::request(format!("invalid URI: {}", url.as_str())))
}
