#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(
    unreachable_pub,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (temporary served folders and files).

pub mod fixtures;

pub use fixtures::{ServedFolder, env_from};
