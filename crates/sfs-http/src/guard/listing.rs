//! Directory request policy applied before path rewriting.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::{Guard, Rejection, Verdict};
use crate::request::RequestContext;
use crate::rewrite::join_request_path;

const INDEX_FILE: &str = "index.html";

/// Guards requests whose path ends in `/`.
#[derive(Debug, Clone)]
pub enum ListingGuard {
    /// Every directory request is answered with 404.
    HardDeny,
    /// Directory requests pass only when the directory holds a regular `index.html`.
    AllowIndexOnly {
        /// Served folder.
        folder: PathBuf,
        /// URL prefix removed before locating the directory.
        prefix: String,
    },
}

#[async_trait]
impl Guard for ListingGuard {
    fn name(&self) -> &'static str {
        match self {
            Self::HardDeny => "listing-deny",
            Self::AllowIndexOnly { .. } => "listing-index-only",
        }
    }

    async fn evaluate(&self, request: &mut RequestContext) -> Verdict {
        let path = request.path();
        if !path.ends_with('/') {
            return Verdict::Allow;
        }
        match self {
            Self::HardDeny => Verdict::Deny(Rejection::not_found()),
            // Malformed paths are left for the rewrite to reject.
            Self::AllowIndexOnly { .. } if request.checked_path().is_err() => Verdict::Allow,
            Self::AllowIndexOnly { folder, prefix } => {
                let relative = path.strip_prefix(prefix.as_str()).unwrap_or(path);
                let index = join_request_path(folder, relative).join(INDEX_FILE);
                match fs::metadata(&index).await {
                    Ok(metadata) if metadata.is_file() => Verdict::Allow,
                    _ => Verdict::Deny(Rejection::not_found()),
                }
            }
        }
    }
}
