#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(
    unreachable_pub,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

//! Configuration facade for the static file server.
//!
//! Layout: `model.rs` (raw and validated configuration types, `AccessPolicy`),
//! `loader.rs` (YAML file + environment overrides), `validate.rs` (startup
//! validation), `defaults.rs` (default values and environment keys).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_with, read_config_file};
pub use model::{
    AccessPolicy, AuthSource, ListenerSettings, ListingMode, ServerConfig, TlsFiles, TlsVersion,
    ValidatedConfig,
};
pub use validate::parse_fast_auth;
