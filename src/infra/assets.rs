//! Disk-backed static asset serving for the active mode's asset root.

use std::{
    io::{self, ErrorKind},
    path::PathBuf,
};

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tokio::fs;

/// Reads built or source assets from one directory root. Paths are treated
/// as untrusted request input.
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// `Ok(None)` covers both "no such asset" and rejected paths; callers
    /// answer 404 for either without leaking which it was.
    pub async fn read(&self, path: &str) -> Result<Option<Bytes>, io::Error> {
        let Some(relative) = sanitize(path) else {
            return Ok(None);
        };
        match fs::read(self.root.join(relative)).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

fn sanitize(path: &str) -> Option<&str> {
    let candidate = path.trim_start_matches('/');
    if candidate.is_empty() || candidate.ends_with('/') {
        // No directory listings.
        return None;
    }
    if candidate
        .split(['/', '\\'])
        .any(|segment| segment == ".." || segment.is_empty())
    {
        return None;
    }
    Some(candidate)
}

/// Build an asset response with a guessed MIME type and immutable caching,
/// matching how the site build fingerprints its output.
pub fn asset_response(path: &str, bytes: Bytes) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let len = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
        headers.insert(header::CONTENT_LENGTH, value);
    }
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );

    response
}

/// Shared 404 for unknown or rejected asset paths.
pub fn asset_not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}
