//! Access-control stages evaluated in order for every request.
//!
//! # Design
//! - A stage either lets the request continue or ends it with a local response.
//! - Denials are never errors; nothing propagates to the server loop.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

use crate::request::RequestContext;

pub mod access_key;
pub mod basic_auth;
pub mod cors;
pub mod listing;
pub mod logging;
pub mod referrer;

pub use access_key::{AccessKeyGuard, AccessKeyInput, access_digest, access_permitted};
pub use basic_auth::BasicAuthGuard;
pub use cors::CorsHeaders;
pub use listing::ListingGuard;
pub use logging::RequestLogger;
pub use referrer::{ReferrerGuard, referrer_allowed};

const NOT_FOUND_BODY: &str = "404 page not found\n";

/// One stage of the request pipeline.
#[async_trait]
pub trait Guard: Send + Sync {
    /// Stable stage identifier used for inspection and logs.
    fn name(&self) -> &'static str;

    /// Inspect the request and decide whether it proceeds.
    async fn evaluate(&self, request: &mut RequestContext) -> Verdict;
}

/// Outcome of a stage.
#[derive(Debug)]
pub enum Verdict {
    /// Continue with the next stage.
    Allow,
    /// Stop and answer with the rejection.
    Deny(Rejection),
}

/// Local response terminating a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    status: StatusCode,
    body: String,
}

impl Rejection {
    /// Rejection with an explicit status and plain-text body.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 403 with the given body.
    #[must_use]
    pub fn forbidden(body: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, body)
    }

    /// 404 with the standard body.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
    }

    /// 400 with the given body.
    #[must_use]
    pub fn bad_request(body: impl Into<String>) -> Self {
        let mut body = body.into();
        body.push('\n');
        Self::new(StatusCode::BAD_REQUEST, body)
    }

    /// Response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        if self.body.is_empty() {
            return self.status.into_response();
        }
        (
            self.status,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.body,
        )
            .into_response()
    }
}
