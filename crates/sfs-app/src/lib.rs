#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(
    unreachable_pub,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

//! Static file server bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (configuration to credentials, pipeline and listener),
//! `error.rs` (application errors).

/// Server bootstrap.
pub mod bootstrap;
/// Application error types.
pub mod error;

pub use bootstrap::{build_pipeline, load_credentials, run_server};
pub use error::{AppError, AppResult};
