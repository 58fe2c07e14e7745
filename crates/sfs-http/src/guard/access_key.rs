//! Per-path access keys: `?key=<secret>` or `?code=<digest>`.
//!
//! The digest of a secret for a path is the uppercase hex MD5 of the path
//! followed by the secret. Failures answer 404 rather than 403.

use async_trait::async_trait;
use md5::{Digest, Md5};

use super::{Guard, Rejection, Verdict};
use crate::request::RequestContext;

const QUERY_KEY: &str = "key";
const QUERY_CODE: &str = "code";

/// Credential presented by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessKeyInput {
    /// The shared secret itself.
    RawKey(String),
    /// A digest computed by the client; compared case-insensitively.
    PrecomputedDigest(String),
}

impl AccessKeyInput {
    /// Pick the input from query values; a non-empty `code` wins over `key`.
    #[must_use]
    pub fn from_query(code: Option<&str>, key: Option<&str>) -> Option<Self> {
        if let Some(code) = code.filter(|value| !value.is_empty()) {
            return Some(Self::PrecomputedDigest(code.to_ascii_uppercase()));
        }
        key.filter(|value| !value.is_empty())
            .map(|key| Self::RawKey(key.to_string()))
    }
}

/// Uppercase hex MD5 of `path` followed by `secret`.
#[must_use]
pub fn access_digest(path: &str, secret: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(path.as_bytes());
    hasher.update(secret.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect()
}

/// Whether `input` grants access to `path` under `secret`.
#[must_use]
pub fn access_permitted(path: &str, secret: &str, input: &AccessKeyInput) -> bool {
    let expected = access_digest(path, secret);
    match input {
        AccessKeyInput::PrecomputedDigest(code) => *code == expected,
        AccessKeyInput::RawKey(key) => access_digest(path, key) == expected,
    }
}

/// Rejects requests lacking a valid key or code with 404.
#[derive(Debug, Clone)]
pub struct AccessKeyGuard {
    secret: String,
}

impl AccessKeyGuard {
    /// Guard checking against `secret`.
    #[must_use]
    pub const fn new(secret: String) -> Self {
        Self { secret }
    }
}

#[async_trait]
impl Guard for AccessKeyGuard {
    fn name(&self) -> &'static str {
        "access-key"
    }

    async fn evaluate(&self, request: &mut RequestContext) -> Verdict {
        let code = request.query_value(QUERY_CODE);
        let key = request.query_value(QUERY_KEY);
        match AccessKeyInput::from_query(code.as_deref(), key.as_deref()) {
            Some(input) if access_permitted(request.path(), &self.secret, &input) => {
                Verdict::Allow
            }
            _ => Verdict::Deny(Rejection::not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_uppercase_md5_of_path_and_secret() {
        let digest = access_digest("/file.txt", "secret");
        assert_eq!(digest.len(), 32);
        assert_eq!(digest, digest.to_ascii_uppercase());
        assert_eq!(access_digest("", ""), "D41D8CD98F00B204E9800998ECF8427E");
    }

    #[test]
    fn code_takes_precedence_over_key() {
        let input = AccessKeyInput::from_query(Some("abc"), Some("secret"));
        assert_eq!(
            input,
            Some(AccessKeyInput::PrecomputedDigest("ABC".to_string()))
        );
        let input = AccessKeyInput::from_query(Some(""), Some("secret"));
        assert_eq!(input, Some(AccessKeyInput::RawKey("secret".to_string())));
        assert_eq!(AccessKeyInput::from_query(None, Some("")), None);
    }

    #[test]
    fn permitted_for_matching_key_or_code() {
        let path = "/p";
        let code = access_digest(path, "S");
        assert!(access_permitted(
            path,
            "S",
            &AccessKeyInput::PrecomputedDigest(code.clone())
        ));
        assert!(access_permitted(
            path,
            "S",
            &AccessKeyInput::RawKey("S".to_string())
        ));
        assert!(!access_permitted(
            path,
            "S",
            &AccessKeyInput::RawKey("T".to_string())
        ));
        assert!(!access_permitted(
            "/other",
            "S",
            &AccessKeyInput::PrecomputedDigest(code)
        ));
    }
}
