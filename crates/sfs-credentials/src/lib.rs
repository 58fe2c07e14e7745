#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(
    unreachable_pub,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

//! Salted, memory-hard credential store backing basic authentication.
//!
//! Layout: `store.rs` (username table and JSON persistence), `kdf.rs` (salt
//! generation and key derivation), `prompt.rs` (interactive password entry),
//! `error.rs` (error types).

pub mod error;
pub mod kdf;
pub mod prompt;
pub mod store;

pub use error::{CredentialError, CredentialResult};
pub use prompt::{PasswordPrompt, TerminalPrompt, resolve_password};
pub use store::{Credential, CredentialStore};
