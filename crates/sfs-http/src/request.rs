//! Per-request view shared by every pipeline stage.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::header::{AUTHORIZATION, HOST, REFERER};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri, Version};
use axum::response::Response;

use crate::guard::Rejection;

/// Decoded request data plus state accumulated by earlier stages.
#[derive(Debug)]
pub struct RequestContext {
    head: Parts,
    path: String,
    decoded: bool,
    remote: Option<SocketAddr>,
    resolved: Option<PathBuf>,
    response_headers: HeaderMap,
}

impl RequestContext {
    /// Build the context, decoding the URL path once.
    ///
    /// A path that does not decode to UTF-8 is kept as received; see
    /// [`RequestContext::checked_path`].
    #[must_use]
    pub fn from_request(request: Request<Body>) -> Self {
        let (head, _body) = request.into_parts();
        let (path, decoded) = match urlencoding::decode(head.uri.path()) {
            Ok(path) => (path.into_owned(), true),
            Err(_) => (head.uri.path().to_string(), false),
        };
        let remote = head
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Self {
            head,
            path,
            decoded,
            remote,
            resolved: None,
            response_headers: HeaderMap::new(),
        }
    }

    /// Percent-decoded URL path, or the raw path when it does not decode.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The decoded path, if it may be mapped onto the file system.
    ///
    /// # Errors
    ///
    /// Rejects with 400 when the path is not UTF-8 once decoded or contains a
    /// `..` segment.
    pub fn checked_path(&self) -> Result<&str, Rejection> {
        if !self.decoded {
            return Err(Rejection::bad_request("invalid URL path encoding"));
        }
        if self.path.split('/').any(|segment| segment == "..") {
            return Err(Rejection::bad_request("invalid URL path"));
        }
        Ok(&self.path)
    }

    /// Request URI as received.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.head.uri
    }

    /// `Referer` header value, empty when absent or not text.
    #[must_use]
    pub fn referer(&self) -> &str {
        self.header_str(&REFERER).unwrap_or("")
    }

    /// `Authorization` header value.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.header_str(&AUTHORIZATION)
    }

    /// `Host` header value, falling back to the URI authority.
    #[must_use]
    pub fn host(&self) -> &str {
        self.header_str(&HOST)
            .or_else(|| self.head.uri.host())
            .unwrap_or("")
    }

    /// First value of query parameter `name`.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<String> {
        let query = self.head.uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.head.method
    }

    /// HTTP protocol version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.head.version
    }

    /// Peer address when the listener recorded it.
    #[must_use]
    pub const fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote
    }

    /// File-system path chosen by the rewrite stage.
    #[must_use]
    pub fn resolved(&self) -> Option<&Path> {
        self.resolved.as_deref()
    }

    /// Record the file-system path for later stages.
    pub fn set_resolved(&mut self, path: PathBuf) {
        self.resolved = Some(path);
    }

    /// Add a header to whatever response this request eventually produces.
    pub fn insert_response_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response_headers.insert(name, value);
    }

    /// Copy of the inbound request with an empty body.
    #[must_use]
    pub fn to_request(&self) -> Request<Body> {
        let mut request = Request::new(Body::empty());
        *request.method_mut() = self.head.method.clone();
        *request.uri_mut() = self.head.uri.clone();
        *request.version_mut() = self.head.version;
        *request.headers_mut() = self.head.headers.clone();
        request
    }

    /// Merge headers accumulated by stages into `response`.
    #[must_use]
    pub fn finish(self, mut response: Response) -> Response {
        response.headers_mut().extend(self.response_headers);
        response
    }

    fn header_str(&self, name: &HeaderName) -> Option<&str> {
        self.head
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }
}
