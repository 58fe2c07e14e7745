#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(
    unreachable_pub,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

//! Telemetry primitives shared across the static file server workspace.
//!
//! Layout: `init.rs` (subscriber installation and build metadata), `error.rs`
//! (error types).

pub mod error;
pub mod init;

pub use error::{TelemetryError, TelemetryResult};
pub use init::{
    DEFAULT_LOG_LEVEL, GlobalContextGuard, LogFormat, LoggingConfig, build_sha, init_logging,
    log_format_from_env,
};
