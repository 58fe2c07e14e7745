//! Per-request access log stage.

use async_trait::async_trait;
use tracing::info;

use super::{Guard, Verdict};
use crate::request::RequestContext;

/// Logs the request and the file it resolved to.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger;

#[async_trait]
impl Guard for RequestLogger {
    fn name(&self) -> &'static str {
        "request-log"
    }

    async fn evaluate(&self, request: &mut RequestContext) -> Verdict {
        let remote = request
            .remote_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_default();
        let resolved = request
            .resolved()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        info!(
            remote = %remote,
            referer = request.referer(),
            method = %request.method(),
            version = ?request.version(),
            host = request.host(),
            path = request.path(),
            resolved = %resolved,
            "request"
        );
        Verdict::Allow
    }
}
