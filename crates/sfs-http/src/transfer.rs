//! Terminal stage: sends the resolved file, index, or directory listing.

use std::io;
use std::path::Path;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::fs;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::warn;

use crate::guard::Rejection;
use crate::request::RequestContext;

const INDEX_FILE: &str = "index.html";

/// Serves the path chosen by the rewrite stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransfer;

impl FileTransfer {
    /// Produce the response for a request whose path has been resolved.
    pub async fn send(&self, request: &RequestContext) -> Response {
        let Some(resolved) = request.resolved() else {
            return Rejection::not_found().into_response();
        };
        let metadata = match fs::metadata(resolved).await {
            Ok(metadata) => metadata,
            Err(err) => return failure_response(&err, resolved),
        };

        if !metadata.is_dir() {
            return serve_file(request, resolved).await;
        }
        if !request.path().ends_with('/') {
            return redirect_to_directory(request);
        }
        let index = resolved.join(INDEX_FILE);
        match fs::metadata(&index).await {
            Ok(metadata) if metadata.is_file() => serve_file(request, &index).await,
            _ => render_listing(resolved).await,
        }
    }
}

async fn serve_file(request: &RequestContext, path: &Path) -> Response {
    match ServeFile::new(path).oneshot(request.to_request()).await {
        Ok(response) => response.map(Body::new),
        Err(infallible) => match infallible {},
    }
}

fn redirect_to_directory(request: &RequestContext) -> Response {
    let mut location = format!("{}/", request.uri().path());
    if let Some(query) = request.uri().query() {
        location.push('?');
        location.push_str(query);
    }
    match HeaderValue::from_str(&location) {
        Ok(value) => (StatusCode::MOVED_PERMANENTLY, [(LOCATION, value)]).into_response(),
        Err(_) => Rejection::bad_request("invalid redirect target").into_response(),
    }
}

async fn render_listing(directory: &Path) -> Response {
    match read_listing(directory).await {
        Ok(entries) => (
            [(CONTENT_TYPE, "text/html; charset=utf-8")],
            listing_html(&entries),
        )
            .into_response(),
        Err(err) => failure_response(&err, directory),
    }
}

async fn read_listing(directory: &Path) -> io::Result<Vec<String>> {
    let mut reader = fs::read_dir(directory).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await?.is_dir() {
            name.push('/');
        }
        entries.push(name);
    }
    entries.sort();
    Ok(entries)
}

/// HTML document listing `entries`; directory names end in `/`.
#[must_use]
pub fn listing_html(entries: &[String]) -> String {
    let mut html =
        String::from("<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n");
    for entry in entries {
        let (name, suffix) = entry
            .strip_suffix('/')
            .map_or((entry.as_str(), ""), |name| (name, "/"));
        let href = format!("{}{suffix}", urlencoding::encode(name));
        html.push_str(&format!(
            "<a href=\"{}\">{}</a>\n",
            escape_html(&href),
            escape_html(entry)
        ));
    }
    html.push_str("</pre>\n");
    html
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn failure_response(err: &io::Error, path: &Path) -> Response {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
            Rejection::not_found().into_response()
        }
        io::ErrorKind::PermissionDenied => {
            Rejection::new(StatusCode::FORBIDDEN, "403 Forbidden\n").into_response()
        }
        _ => {
            warn!(error = %err, path = %path.display(), "file transfer failed");
            Rejection::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "500 Internal Server Error\n",
            )
            .into_response()
        }
    }
}
