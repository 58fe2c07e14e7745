//! Ordered stage chain around the terminal file transfer.
//!
//! # Design
//! - Stages run outermost first: basic auth, access key, CORS, listing policy,
//!   path rewrite, referrer, request log, then transfer.
//! - Stages before the rewrite see only the inbound request; later stages also
//!   see the resolved file path.
//! - Malformed paths are rejected by the rewrite, after authentication.
//! - The chain is built once from an `AccessPolicy` and shared read-only.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use sfs_config::{AccessPolicy, ListingMode};
use sfs_credentials::CredentialStore;

use crate::guard::{
    AccessKeyGuard, BasicAuthGuard, CorsHeaders, Guard, ListingGuard, ReferrerGuard,
    RequestLogger, Verdict,
};
use crate::request::RequestContext;
use crate::rewrite::PathRewrite;
use crate::transfer::FileTransfer;

/// Composed request handler.
pub struct Pipeline {
    stages: Vec<Box<dyn Guard>>,
    transfer: FileTransfer,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Stage names in execution order, excluding the terminal transfer.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage and, if all allow, the file transfer.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let mut context = RequestContext::from_request(request);
        for stage in &self.stages {
            if let Verdict::Deny(rejection) = stage.evaluate(&mut context).await {
                return context.finish(rejection.into_response());
            }
        }
        let response = self.transfer.send(&context).await;
        context.finish(response)
    }
}

/// Assembles a [`Pipeline`] from policy flags.
#[derive(Debug)]
pub struct PipelineBuilder {
    policy: AccessPolicy,
    folder: PathBuf,
    credentials: Option<Arc<CredentialStore>>,
    log_requests: bool,
}

impl PipelineBuilder {
    /// Start from a policy snapshot and the served folder.
    #[must_use]
    pub fn new(policy: &AccessPolicy, folder: impl Into<PathBuf>) -> Self {
        Self {
            policy: policy.clone(),
            folder: folder.into(),
            credentials: None,
            log_requests: false,
        }
    }

    /// Require basic authentication against `store`.
    #[must_use]
    pub fn with_credentials(mut self, store: Arc<CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    /// Log every request that reaches the transfer.
    #[must_use]
    pub const fn log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    /// Build the stage chain.
    #[must_use]
    pub fn build(self) -> Pipeline {
        let policy = self.policy;
        let mut stages: Vec<Box<dyn Guard>> = Vec::new();

        if let Some(store) = self.credentials {
            stages.push(Box::new(BasicAuthGuard::new(store)));
        }
        if !policy.access_key.is_empty() {
            stages.push(Box::new(AccessKeyGuard::new(policy.access_key)));
        }
        if policy.cors {
            stages.push(Box::new(CorsHeaders));
        }
        match policy.listing {
            ListingMode::Hidden => stages.push(Box::new(ListingGuard::HardDeny)),
            ListingMode::AllowIndexOnly => stages.push(Box::new(ListingGuard::AllowIndexOnly {
                folder: self.folder.clone(),
                prefix: policy.url_prefix.clone(),
            })),
            ListingMode::Shown => {}
        }
        stages.push(Box::new(PathRewrite::new(self.folder, &policy.url_prefix)));
        if !policy.referrers.is_empty() {
            stages.push(Box::new(ReferrerGuard::new(policy.referrers)));
        }
        if self.log_requests {
            stages.push(Box::new(RequestLogger));
        }

        Pipeline {
            stages,
            transfer: FileTransfer,
        }
    }
}
