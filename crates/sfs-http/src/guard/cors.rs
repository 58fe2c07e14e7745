//! Wildcard CORS response headers.

use async_trait::async_trait;
use axum::http::HeaderValue;
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN};

use super::{Guard, Verdict};
use crate::request::RequestContext;

/// Adds `Access-Control-Allow-Origin: *` and `Access-Control-Allow-Headers: *`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorsHeaders;

#[async_trait]
impl Guard for CorsHeaders {
    fn name(&self) -> &'static str {
        "cors"
    }

    async fn evaluate(&self, request: &mut RequestContext) -> Verdict {
        let wildcard = HeaderValue::from_static("*");
        request.insert_response_header(ACCESS_CONTROL_ALLOW_ORIGIN, wildcard.clone());
        request.insert_response_header(ACCESS_CONTROL_ALLOW_HEADERS, wildcard);
        Verdict::Allow
    }
}
