//! Default values and environment variable names for configuration fields.
//!
//! # Design
//! - Keep defaults in one place so the YAML model and env overrides agree.
//! - Environment names match the documented deployment surface verbatim.

/// Folder served when none is configured.
pub const DEFAULT_FOLDER: &str = "/web";
/// Port bound when none is configured.
pub const DEFAULT_PORT: u16 = 8080;
/// Whether directory requests resolve to their index by default.
pub const DEFAULT_SHOW_LISTING: bool = true;
/// Whether `index.html` may still be served when listings are hidden.
pub const DEFAULT_ALLOW_INDEX: bool = true;

pub(crate) const ENV_CORS: &str = "CORS";
pub(crate) const ENV_DEBUG: &str = "DEBUG";
pub(crate) const ENV_FOLDER: &str = "FOLDER";
pub(crate) const ENV_HOST: &str = "HOST";
pub(crate) const ENV_PORT: &str = "PORT";
pub(crate) const ENV_REFERRERS: &str = "REFERRERS";
pub(crate) const ENV_ALLOW_INDEX: &str = "ALLOW_INDEX";
pub(crate) const ENV_SHOW_LISTING: &str = "SHOW_LISTING";
pub(crate) const ENV_TLS_CERT: &str = "TLS_CERT";
pub(crate) const ENV_TLS_KEY: &str = "TLS_KEY";
pub(crate) const ENV_TLS_MIN_VERS: &str = "TLS_MIN_VERS";
pub(crate) const ENV_URL_PREFIX: &str = "URL_PREFIX";
pub(crate) const ENV_ACCESS_KEY: &str = "ACCESS_KEY";
/// Environment variable naming the credential file.
pub const ENV_CREDENTIALS: &str = "CREDENTIALS";
pub(crate) const ENV_FAST_AUTH: &str = "FAST_AUTH";
