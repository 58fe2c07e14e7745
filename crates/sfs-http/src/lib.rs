#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(
    unreachable_pub,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

//! Guarded static file serving over HTTP and HTTPS.
//!
//! Layout: `request.rs` (per-request context), `guard/` (access-control
//! stages), `rewrite.rs` (URL path to file path), `pipeline.rs` (ordered stage
//! chain and its builder), `transfer.rs` (terminal file transfer), `router.rs`
//! (axum wiring and tracing layers), `listener.rs` (plain/TLS selection),
//! `error.rs` (error types).

pub mod error;
pub mod guard;
pub mod listener;
pub mod pipeline;
pub mod request;
pub mod rewrite;
pub mod router;
pub mod transfer;

pub use error::{ServerError, ServerResult};
pub use guard::{Guard, Rejection, Verdict};
pub use listener::{Listener, shutdown_signal};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use request::RequestContext;
pub use rewrite::PathRewrite;
pub use router::{HEADER_REQUEST_ID, build_router};
pub use transfer::FileTransfer;
