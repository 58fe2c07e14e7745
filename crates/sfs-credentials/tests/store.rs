use std::fs;

use anyhow::{Result, anyhow};
use sfs_credentials::{CredentialError, CredentialStore, PasswordPrompt};

struct FixedPrompt(&'static str);

impl PasswordPrompt for FixedPrompt {
    fn prompt(&self, _message: &str) -> sfs_credentials::CredentialResult<String> {
        Ok(self.0.to_string())
    }
}

struct NoPrompt;

impl PasswordPrompt for NoPrompt {
    fn prompt(&self, _message: &str) -> sfs_credentials::CredentialResult<String> {
        Err(CredentialError::NotInteractive)
    }
}

#[test]
fn update_regenerates_salt_and_replaces_password() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("creds.json");
    let mut store = CredentialStore::load_or_create(&path)?;

    store.add("alice", "first")?;
    let before = store
        .get("alice")
        .cloned()
        .ok_or_else(|| anyhow!("alice missing after add"))?;
    assert!(store.matches("alice", "first")?);

    store.update("alice", "second")?;
    let after = store
        .get("alice")
        .cloned()
        .ok_or_else(|| anyhow!("alice missing after update"))?;
    assert_ne!(before.salt, after.salt);
    assert!(!store.matches("alice", "first")?);
    assert!(store.matches("alice", "second")?);
    Ok(())
}

#[test]
fn mutations_persist_to_json_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("creds.json");
    let mut store = CredentialStore::load_or_create(&path)?;
    store.add("alice", "pw")?;
    store.add("bob", "pw2")?;

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let alice = raw
        .get("alice")
        .ok_or_else(|| anyhow!("alice missing from file"))?;
    assert!(alice.get("salt").is_some());
    assert!(alice.get("pass").is_some());

    let reloaded = CredentialStore::load(&path)?;
    assert_eq!(reloaded.usernames().collect::<Vec<_>>(), vec!["alice", "bob"]);
    assert!(reloaded.matches("bob", "pw2")?);
    Ok(())
}

#[cfg(unix)]
#[test]
fn credential_file_is_private() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("creds.json");
    let mut store = CredentialStore::load_or_create(&path)?;
    store.add("alice", "pw")?;
    let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
    Ok(())
}

#[test]
fn remove_then_add_and_double_remove() -> Result<()> {
    let mut store = CredentialStore::in_memory();
    store.add("alice", "pw")?;
    store.remove("alice")?;
    store.add("alice", "pw")?;
    store.remove("alice")?;
    let err = store
        .remove("alice")
        .err()
        .ok_or_else(|| anyhow!("expected NotFound"))?;
    assert!(matches!(err, CredentialError::NotFound { .. }));
    Ok(())
}

#[test]
fn add_existing_and_update_missing_are_rejected() -> Result<()> {
    let mut store = CredentialStore::in_memory();
    store.add("alice", "pw")?;
    assert!(matches!(
        store.add("alice", "pw"),
        Err(CredentialError::AlreadyExists { .. })
    ));
    assert!(matches!(
        store.update("bob", "pw"),
        Err(CredentialError::NotFound { .. })
    ));
    Ok(())
}

#[test]
fn prompted_add_checks_username_before_prompting() -> Result<()> {
    let mut store = CredentialStore::in_memory();
    store.add("alice", "pw")?;
    assert!(matches!(
        store.add_prompted("alice", None, &NoPrompt),
        Err(CredentialError::AlreadyExists { .. })
    ));
    store.add_prompted("bob", None, &FixedPrompt("typed"))?;
    assert!(store.matches("bob", "typed")?);
    store.update_prompted("bob", Some("given"), &NoPrompt)?;
    assert!(store.matches("bob", "given")?);
    Ok(())
}

#[test]
fn load_distinguishes_missing_and_malformed_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("missing.json");
    assert!(matches!(
        CredentialStore::load(&missing),
        Err(CredentialError::FileMissing { .. })
    ));

    let malformed = dir.path().join("bad.json");
    fs::write(&malformed, "{not json")?;
    assert!(matches!(
        CredentialStore::load(&malformed),
        Err(CredentialError::Parse { .. })
    ));
    Ok(())
}

#[test]
fn failed_write_leaves_store_unchanged() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let nested = dir.path().join("nested");
    fs::create_dir(&nested)?;
    let path = nested.join("creds.json");
    let mut store = CredentialStore::load_or_create(&path)?;
    store.add("alice", "first")?;

    fs::remove_dir_all(&nested)?;

    assert!(matches!(
        store.add("bob", "pw"),
        Err(CredentialError::Io { .. })
    ));
    assert!(!store.contains("bob"));

    assert!(matches!(
        store.update("alice", "second"),
        Err(CredentialError::Io { .. })
    ));
    assert!(store.matches("alice", "first")?);

    assert!(matches!(
        store.remove("alice"),
        Err(CredentialError::Io { .. })
    ));
    assert!(store.contains("alice"));
    Ok(())
}
