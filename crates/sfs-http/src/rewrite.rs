//! Mapping from URL path to file-system path.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::guard::{Guard, Rejection, Verdict};
use crate::request::RequestContext;

/// Join a URL path below `folder`, ignoring its leading `/`.
#[must_use]
pub fn join_request_path(folder: &Path, path: &str) -> PathBuf {
    folder.join(path.trim_start_matches('/'))
}

/// How request paths map onto the served folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRewrite {
    /// The full request path is appended to the folder.
    Direct {
        /// Served folder.
        folder: PathBuf,
    },
    /// The path must start with `prefix`, which is removed before appending.
    PrefixStripped {
        /// Served folder.
        folder: PathBuf,
        /// Literal URL prefix.
        prefix: String,
    },
}

impl PathRewrite {
    /// Choose the rewrite for `folder` and an optional prefix.
    #[must_use]
    pub fn new(folder: PathBuf, prefix: &str) -> Self {
        if prefix.is_empty() {
            Self::Direct { folder }
        } else {
            Self::PrefixStripped {
                folder,
                prefix: prefix.to_string(),
            }
        }
    }

    /// Resolve a decoded request path.
    ///
    /// # Errors
    ///
    /// Rejects with 404 when a prefix is configured and the path lies outside it.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, Rejection> {
        match self {
            Self::Direct { folder } => Ok(join_request_path(folder, path)),
            Self::PrefixStripped { folder, prefix } => path
                .strip_prefix(prefix.as_str())
                .map(|rest| join_request_path(folder, rest))
                .ok_or_else(Rejection::not_found),
        }
    }
}

#[async_trait]
impl Guard for PathRewrite {
    fn name(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "rewrite-direct",
            Self::PrefixStripped { .. } => "rewrite-prefix",
        }
    }

    async fn evaluate(&self, request: &mut RequestContext) -> Verdict {
        let resolved = request
            .checked_path()
            .and_then(|path| self.resolve(path));
        match resolved {
            Ok(resolved) => {
                request.set_resolved(resolved);
                Verdict::Allow
            }
            Err(rejection) => Verdict::Deny(rejection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn direct_appends_full_path() -> anyhow::Result<()> {
        let rewrite = PathRewrite::new(PathBuf::from("/srv/web"), "");
        assert_eq!(
            rewrite.resolve("/a/b.txt").map_err(|r| anyhow::anyhow!("{r:?}"))?,
            PathBuf::from("/srv/web/a/b.txt")
        );
        Ok(())
    }

    #[test]
    fn prefix_is_stripped_or_rejected() -> anyhow::Result<()> {
        let rewrite = PathRewrite::new(PathBuf::from("/srv/web"), "/p");
        assert_eq!(
            rewrite.resolve("/p/a.txt").map_err(|r| anyhow::anyhow!("{r:?}"))?,
            PathBuf::from("/srv/web/a.txt")
        );
        let rejection = rewrite
            .resolve("/q/a.txt")
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected rejection"))?;
        assert_eq!(rejection.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
