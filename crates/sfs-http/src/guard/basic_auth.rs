//! HTTP basic authentication against the credential store.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sfs_credentials::CredentialStore;
use tokio::task;
use tracing::warn;

use super::{Guard, Rejection, Verdict};
use crate::request::RequestContext;

const BASIC_SCHEME: &str = "basic ";

/// Rejects requests without valid basic credentials with 403.
#[derive(Debug, Clone)]
pub struct BasicAuthGuard {
    store: Arc<CredentialStore>,
}

impl BasicAuthGuard {
    /// Guard checking against `store`.
    #[must_use]
    pub const fn new(store: Arc<CredentialStore>) -> Self {
        Self { store }
    }
}

/// Split an `Authorization: Basic` value into non-empty username and password.
#[must_use]
pub fn parse_basic(header: &str) -> Option<(String, String)> {
    let scheme = header.get(..BASIC_SCHEME.len())?;
    if !scheme.eq_ignore_ascii_case(BASIC_SCHEME) {
        return None;
    }
    let decoded = STANDARD.decode(header[BASIC_SCHEME.len()..].trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    if username.is_empty() || password.is_empty() {
        return None;
    }
    Some((username.to_string(), password.to_string()))
}

#[async_trait]
impl Guard for BasicAuthGuard {
    fn name(&self) -> &'static str {
        "basic-auth"
    }

    async fn evaluate(&self, request: &mut RequestContext) -> Verdict {
        let Some((username, password)) = request.authorization().and_then(parse_basic) else {
            return Verdict::Deny(Rejection::forbidden(""));
        };
        if !self.store.contains(&username) {
            return Verdict::Deny(Rejection::forbidden(""));
        }

        let store = Arc::clone(&self.store);
        let outcome =
            task::spawn_blocking(move || store.matches(&username, &password)).await;
        match outcome {
            Ok(Ok(true)) => Verdict::Allow,
            Ok(Ok(false)) => Verdict::Deny(Rejection::forbidden("")),
            Ok(Err(err)) => {
                warn!(error = %err, "credential check failed");
                Verdict::Deny(Rejection::forbidden(""))
            }
            Err(err) => {
                warn!(error = %err, "credential check task failed");
                Verdict::Deny(Rejection::forbidden(""))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn parses_well_formed_header() {
        assert_eq!(
            parse_basic(&header("alice:pa:ss")),
            Some(("alice".to_string(), "pa:ss".to_string()))
        );
        assert_eq!(
            parse_basic(&format!("bAsIc {}", STANDARD.encode("a:b"))),
            Some(("a".to_string(), "b".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_or_empty_parts() {
        assert_eq!(parse_basic("Bearer token"), None);
        assert_eq!(parse_basic("Basic !!!"), None);
        assert_eq!(parse_basic(&header("nocolon")), None);
        assert_eq!(parse_basic(&header(":pass")), None);
        assert_eq!(parse_basic(&header("user:")), None);
        assert_eq!(parse_basic("Ba"), None);
    }
}
