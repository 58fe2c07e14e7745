//! `Referer` allow-listing.

use async_trait::async_trait;

use super::{Guard, Rejection, Verdict};
use crate::request::RequestContext;

/// Whether `referer` is admitted by `whitelist`.
///
/// An empty whitelist admits everything. An empty entry admits only a missing
/// referer; other entries match as literal prefixes.
#[must_use]
pub fn referrer_allowed(whitelist: &[String], referer: &str) -> bool {
    if whitelist.is_empty() {
        return true;
    }
    whitelist.iter().any(|entry| {
        if entry.is_empty() {
            referer.is_empty()
        } else {
            referer.starts_with(entry.as_str())
        }
    })
}

/// Rejects requests whose `Referer` is not allow-listed with 403.
#[derive(Debug, Clone)]
pub struct ReferrerGuard {
    whitelist: Vec<String>,
}

impl ReferrerGuard {
    /// Guard over the given allow-list.
    #[must_use]
    pub const fn new(whitelist: Vec<String>) -> Self {
        Self { whitelist }
    }
}

#[async_trait]
impl Guard for ReferrerGuard {
    fn name(&self) -> &'static str {
        "referrer"
    }

    async fn evaluate(&self, request: &mut RequestContext) -> Verdict {
        let referer = request.referer();
        if referrer_allowed(&self.whitelist, referer) {
            Verdict::Allow
        } else {
            Verdict::Deny(Rejection::forbidden(format!(
                "Invalid source '{referer}'\n"
            )))
        }
    }
}
