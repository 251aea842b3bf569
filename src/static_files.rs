//! Static asset serving for route groups.
//!
//! A group may associate one asset directory with one URL prefix. Matching
//! is prefix-based and boundary-aware; resolution inside the directory goes
//! through the lexical traversal guard in [`paths`](crate::paths), so a
//! request can never read outside the configured directory. Symlinks placed
//! *inside* the directory are the operator's choice and are followed.

use std::io::ErrorKind;
use std::path::PathBuf;

use bytes::Bytes;

use crate::error::DispatchError;
use crate::paths;
use crate::response::{ContentType, Response};

/// A group's static-asset association: requests under `url_prefix` are
/// served from `dir`.
#[derive(Clone, Debug)]
pub(crate) struct StaticAssets {
    dir: PathBuf,
    url_prefix: String,
}

impl StaticAssets {
    /// `url_prefix` is group-local, like route paths; it is joined with the
    /// mount prefix when the group is mounted.
    pub(crate) fn new(dir: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: paths::normalize_prefix(url_prefix),
        }
    }

    /// Rebases the URL prefix under a mount prefix. Both sides are already
    /// normalized, so concatenation cannot produce a doubled slash.
    pub(crate) fn mounted_under(mut self, mount_prefix: &str) -> Self {
        self.url_prefix = format!("{mount_prefix}{}", self.url_prefix);
        self
    }

    pub(crate) fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// True when `path` falls under this prefix.
    ///
    /// Boundary-aware: with prefix `/client/static`, the path
    /// `/client/staticx` does not match, `/client/static/app.js` does.
    pub(crate) fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(&self.url_prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Reads the asset addressed by `request_path` (which must match this
    /// prefix) and labels it by extension.
    ///
    /// Directory requests are a plain miss — there is no index serving.
    pub(crate) async fn load(&self, request_path: &str) -> Result<Response, DispatchError> {
        let remainder = request_path
            .strip_prefix(&self.url_prefix)
            .unwrap_or(request_path);
        if remainder.trim_matches('/').is_empty() {
            return Err(DispatchError::NotFound);
        }

        let file = paths::resolve_under(&self.dir, remainder).ok_or_else(|| {
            DispatchError::Forbidden { path: request_path.to_owned() }
        })?;

        match tokio::fs::read(&file).await {
            Ok(contents) => {
                let content_type = file
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(ContentType::from_extension)
                    .unwrap_or(ContentType::OctetStream);
                Ok(Response::with_content_type(content_type, Bytes::from(contents)))
            }
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
                Err(DispatchError::NotFound)
            }
            Err(e) => Err(DispatchError::Io(e)),
        }
    }
}
