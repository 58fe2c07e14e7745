//! Username table with JSON persistence.
//!
//! # Design
//! - Every mutation regenerates the salt before deriving and then persists the
//!   whole table when the store is file-backed.
//! - The table is written before it replaces the in-memory copy, so a failed
//!   write leaves the store unchanged.
//! - While serving the store is read-only and shared behind an `Arc`.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CredentialError, CredentialResult};
use crate::kdf;
use crate::prompt::{PasswordPrompt, resolve_password};

/// Stored salt and derived hash for one user, both base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Random salt regenerated on every password change.
    pub salt: String,
    /// Key derived from the password and salt.
    pub pass: String,
}

impl Credential {
    /// Build a credential for `password` under a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty password or when salting or derivation fails.
    pub fn new(password: &str) -> CredentialResult<Self> {
        if password.is_empty() {
            return Err(CredentialError::EmptyPassword);
        }
        let salt = kdf::generate_salt()?;
        let pass = kdf::derive(password, &salt)?;
        Ok(Self { salt, pass })
    }

    /// Re-derive with the stored salt and compare against the stored hash.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored salt is corrupt or derivation fails.
    pub fn verify(&self, password: &str) -> CredentialResult<bool> {
        // Plain equality; comparison time depends on the matching prefix length.
        Ok(kdf::derive(password, &self.salt)? == self.pass)
    }
}

/// In-memory username table, optionally backed by a JSON file.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    path: Option<PathBuf>,
    credentials: BTreeMap<String, Credential>,
}

impl CredentialStore {
    /// Empty store with no backing file.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store holding a single user, used for inline shared-secret auth.
    ///
    /// # Errors
    ///
    /// Returns an error when the credential cannot be derived.
    pub fn shared(username: &str, password: &str) -> CredentialResult<Self> {
        let mut store = Self::in_memory();
        store.add(username, password)?;
        Ok(store)
    }

    /// Load a store from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::FileMissing`] when the file does not exist,
    /// or an IO/parse error otherwise.
    pub fn load(path: &Path) -> CredentialResult<Self> {
        let contents = match fs::read(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(CredentialError::FileMissing {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(CredentialError::Io {
                    operation: "credentials.read",
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let credentials =
            serde_json::from_slice(&contents).map_err(|source| CredentialError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            credentials,
        })
    }

    /// Load a store from `path`, starting empty when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error when an existing file cannot be read or parsed.
    pub fn load_or_create(path: &Path) -> CredentialResult<Self> {
        match Self::load(path) {
            Err(CredentialError::FileMissing { .. }) => {
                warn!(path = %path.display(), "credential file does not exist; creating");
                Ok(Self {
                    path: Some(path.to_path_buf()),
                    credentials: BTreeMap::new(),
                })
            }
            other => other,
        }
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Serialize the table to `path`, overwriting it.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn save(&self, path: &Path) -> CredentialResult<()> {
        write_table(path, &self.credentials)
    }

    /// Add a new user.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::AlreadyExists`] for a known username, or an
    /// error from derivation or persistence.
    pub fn add(&mut self, username: &str, password: &str) -> CredentialResult<()> {
        self.ensure_absent(username)?;
        let mut next = self.credentials.clone();
        next.insert(username.to_string(), Credential::new(password)?);
        self.commit(next)?;
        info!(username, "credential added");
        Ok(())
    }

    /// Add a new user, prompting for the password when none is supplied.
    ///
    /// The username is checked before any prompt is shown.
    ///
    /// # Errors
    ///
    /// See [`CredentialStore::add`] and [`resolve_password`].
    pub fn add_prompted(
        &mut self,
        username: &str,
        password: Option<&str>,
        prompt: &dyn PasswordPrompt,
    ) -> CredentialResult<()> {
        self.ensure_absent(username)?;
        let password = resolve_password(password, prompt)?;
        self.add(username, &password)
    }

    /// Replace an existing user's password under a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] for an unknown username, or an
    /// error from derivation or persistence.
    pub fn update(&mut self, username: &str, password: &str) -> CredentialResult<()> {
        self.ensure_present(username)?;
        let mut next = self.credentials.clone();
        next.insert(username.to_string(), Credential::new(password)?);
        self.commit(next)?;
        info!(username, "credential updated");
        Ok(())
    }

    /// Update an existing user, prompting for the password when none is supplied.
    ///
    /// # Errors
    ///
    /// See [`CredentialStore::update`] and [`resolve_password`].
    pub fn update_prompted(
        &mut self,
        username: &str,
        password: Option<&str>,
        prompt: &dyn PasswordPrompt,
    ) -> CredentialResult<()> {
        self.ensure_present(username)?;
        let password = resolve_password(password, prompt)?;
        self.update(username, &password)
    }

    /// Remove a user.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] for an unknown username, or a
    /// persistence error.
    pub fn remove(&mut self, username: &str) -> CredentialResult<()> {
        self.ensure_present(username)?;
        let mut next = self.credentials.clone();
        next.remove(username);
        self.commit(next)?;
        info!(username, "credential removed");
        Ok(())
    }

    /// Known usernames in sorted order.
    pub fn usernames(&self) -> impl Iterator<Item = &str> + '_ {
        self.credentials.keys().map(String::as_str)
    }

    /// Number of stored users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Whether the store holds no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Whether `username` is known.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.credentials.contains_key(username)
    }

    /// Stored credential for `username`.
    #[must_use]
    pub fn get(&self, username: &str) -> Option<&Credential> {
        self.credentials.get(username)
    }

    /// Check `password` for `username`; an unknown user is `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored credential is corrupt or derivation fails.
    pub fn matches(&self, username: &str, password: &str) -> CredentialResult<bool> {
        match self.credentials.get(username) {
            Some(credential) => credential.verify(password),
            None => Ok(false),
        }
    }

    fn ensure_absent(&self, username: &str) -> CredentialResult<()> {
        if username.is_empty() {
            return Err(CredentialError::EmptyUsername);
        }
        if self.contains(username) {
            return Err(CredentialError::AlreadyExists {
                username: username.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_present(&self, username: &str) -> CredentialResult<()> {
        if self.contains(username) {
            Ok(())
        } else {
            Err(CredentialError::NotFound {
                username: username.to_string(),
            })
        }
    }

    fn commit(&mut self, next: BTreeMap<String, Credential>) -> CredentialResult<()> {
        if let Some(path) = &self.path {
            write_table(path, &next)?;
        }
        self.credentials = next;
        Ok(())
    }
}

fn write_table(path: &Path, credentials: &BTreeMap<String, Credential>) -> CredentialResult<()> {
    let contents = serde_json::to_vec_pretty(credentials)
        .map_err(|source| CredentialError::Serialize { source })?;
    write_private(path, &contents).map_err(|source| CredentialError::Io {
        operation: "credentials.write",
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_does_not_persist() -> anyhow::Result<()> {
        let mut store = CredentialStore::in_memory();
        store.add("alice", "pw")?;
        assert!(store.path().is_none());
        assert!(store.matches("alice", "pw")?);
        assert!(!store.matches("alice", "nope")?);
        assert!(!store.matches("bob", "pw")?);
        Ok(())
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let mut store = CredentialStore::in_memory();
        assert!(matches!(
            store.add("", "pw"),
            Err(CredentialError::EmptyUsername)
        ));
        assert!(matches!(
            store.add("alice", ""),
            Err(CredentialError::EmptyPassword)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn shared_store_holds_one_user() -> anyhow::Result<()> {
        let store = CredentialStore::shared("admin", "secret")?;
        assert_eq!(store.len(), 1);
        assert!(store.matches("admin", "secret")?);
        Ok(())
    }
}
