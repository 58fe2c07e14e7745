//! Salt generation and memory-hard key derivation.
//!
//! Argon2id with fixed parameters (19 MiB, two passes, one lane) producing a
//! 32-byte key; salts are 24 bytes from the operating system RNG.
//!
//! Tables whose hashes were derived with scrypt (N=16384, r=8, p=1) never
//! verify here; those users must be re-added.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::{CredentialError, CredentialResult};

/// Raw salt length in bytes.
pub const SALT_LEN: usize = 24;
/// Derived key length in bytes.
pub const HASH_LEN: usize = 32;

const MEMORY_KIB: u32 = 19_456;
const ITERATIONS: u32 = 2;
const LANES: u32 = 1;

/// Draw a fresh salt and return it base64-encoded.
///
/// # Errors
///
/// Returns [`CredentialError::Entropy`] when the OS RNG fails.
pub fn generate_salt() -> CredentialResult<String> {
    let mut salt = [0_u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|source| CredentialError::Entropy { source })?;
    Ok(STANDARD.encode(salt))
}

/// Derive the base64-encoded hash of `password` under a base64-encoded salt.
///
/// # Errors
///
/// Returns an error when the salt is not base64 or derivation fails.
pub fn derive(password: &str, salt: &str) -> CredentialResult<String> {
    let salt = STANDARD
        .decode(salt)
        .map_err(|source| CredentialError::Encoding { source })?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params()?);
    let mut output = [0_u8; HASH_LEN];
    argon
        .hash_password_into(password.as_bytes(), &salt, &mut output)
        .map_err(|detail| CredentialError::Derive { detail })?;
    Ok(STANDARD.encode(output))
}

fn params() -> CredentialResult<Params> {
    Params::new(MEMORY_KIB, ITERATIONS, LANES, Some(HASH_LEN))
        .map_err(|detail| CredentialError::Derive { detail })
}
