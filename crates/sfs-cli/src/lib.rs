#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(
    unreachable_pub,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line entry point for the static file server.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: command handlers grouped by concern
//! - `error.rs`: CLI error and exit-code mapping
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod commands;
pub(crate) mod error;

pub use cli::run;
