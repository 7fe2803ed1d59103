#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Byte-level transport for the dataset loaders.
//!
//! A "path" is either an `http(s)` URL (fetched with `reqwest`) or a
//! filesystem path (read with `tokio::fs`). User uploads arrive as
//! in-memory [`Upload`] values and never touch the transport. Fetching is
//! the only async suspension point in the whole load pipeline; no timeout
//! or retry is applied here, that stays with the caller's HTTP stack.

use std::path::Path;

/// Errors that can occur while fetching raw bytes.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The resource does not exist (HTTP non-success or missing file).
    #[error("Resource not found: {path}{}", .status.map_or_else(String::new, |s| format!(" (HTTP {s})")))]
    NotFound {
        /// The path or URL that was requested.
        path: String,
        /// HTTP status code, when the path was a URL.
        status: Option<u16>,
    },

    /// HTTP request failed below the status-code level.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local file read failed for a reason other than absence.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fetched resource: raw bytes plus the `Content-Type` header when the
/// source was an HTTP response. Local files carry no content type.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// Raw response or file bytes.
    pub bytes: Vec<u8>,
    /// `Content-Type` header value, lowercased, if any.
    pub content_type: Option<String>,
}

/// An in-memory file supplied by the user (file-picker upload).
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original file name, used for extension dispatch.
    pub name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Creates an upload from a name and its bytes.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Lowercased file extension, without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }
}

/// Lowercased extension of a path or URL, without the dot. Query strings
/// on URLs are ignored.
#[must_use]
pub fn extension_of(path: &str) -> Option<String> {
    let without_query = path.split(['?', '#']).next().unwrap_or(path);
    Path::new(without_query)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// Fetches the raw bytes behind a path.
///
/// `http://` and `https://` paths go over the network; everything else is
/// read from the local filesystem. A non-success HTTP status or a missing
/// file both surface as [`FetchError::NotFound`] carrying the path.
///
/// # Errors
///
/// Returns [`FetchError`] if the request or read fails.
pub async fn fetch_bytes(path: &str) -> Result<Fetched, FetchError> {
    if path.starts_with("http://") || path.starts_with("https://") {
        fetch_url(path).await
    } else {
        fetch_file(path).await
    }
}

async fn fetch_url(url: &str) -> Result<Fetched, FetchError> {
    log::debug!("Fetching {url}...");
    let response = reqwest::get(url).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::NotFound {
            path: url.to_owned(),
            status: Some(status.as_u16()),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_lowercase);

    let bytes = response.bytes().await?.to_vec();
    log::debug!("Fetched {} bytes from {url}", bytes.len());

    Ok(Fetched {
        bytes,
        content_type,
    })
}

async fn fetch_file(path: &str) -> Result<Fetched, FetchError> {
    log::debug!("Reading {path}...");
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Fetched {
            bytes,
            content_type: None,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::NotFound {
            path: path.to_owned(),
            status: None,
        }),
        Err(e) => Err(e.into()),
    }
}
