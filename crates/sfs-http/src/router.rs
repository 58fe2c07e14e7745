//! Axum router hosting the pipeline behind tracing and request-id layers.
//!
//! Every response carries `x-request-id`: the client's value when supplied,
//! otherwise a generated UUID.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::Response;
use sfs_telemetry::build_sha;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::pipeline::Pipeline;

/// Header carrying the per-request identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Wrap `pipeline` as the fallback handler of a router.
pub fn build_router(pipeline: Arc<Pipeline>) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get(HEADER_REQUEST_ID)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("")
                .to_string();
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id,
                build_sha = %build_sha(),
                status_code = tracing::field::Empty,
                latency_ms = tracing::field::Empty
            )
        })
        .on_request(|_request: &Request<_>, _span: &Span| {})
        .on_response(|response: &Response, latency: Duration, span: &Span| {
            span.record("status_code", response.status().as_u16());
            let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
            span.record("latency_ms", latency_ms);
        });
    let layered = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(trace_layer);

    Router::new()
        .fallback(serve_request)
        .with_state(pipeline)
        .layer(layered)
}

async fn serve_request(State(pipeline): State<Arc<Pipeline>>, request: Request<Body>) -> Response {
    pipeline.handle(request).await
}
