//! `auth` subcommands managing the credential file.

use std::io::Write;
use std::path::Path;

use sfs_credentials::{CredentialError, CredentialStore, PasswordPrompt};

use crate::error::{CliError, CliResult};

pub(crate) fn handle_add(
    path: &Path,
    username: &str,
    password: Option<&str>,
    prompt: &dyn PasswordPrompt,
    out: &mut impl Write,
) -> CliResult<()> {
    let mut store =
        CredentialStore::load_or_create(path).map_err(|err| store_error(err, path))?;
    store
        .add_prompted(username, password, prompt)
        .map_err(|err| store_error(err, path))?;
    writeln!(out, "added user '{username}'").map_err(write_error)
}

pub(crate) fn handle_update(
    path: &Path,
    username: &str,
    password: Option<&str>,
    prompt: &dyn PasswordPrompt,
    out: &mut impl Write,
) -> CliResult<()> {
    let mut store = CredentialStore::load(path).map_err(|err| store_error(err, path))?;
    store
        .update_prompted(username, password, prompt)
        .map_err(|err| store_error(err, path))?;
    writeln!(out, "updated user '{username}'").map_err(write_error)
}

pub(crate) fn handle_remove(path: &Path, username: &str, out: &mut impl Write) -> CliResult<()> {
    let mut store = CredentialStore::load(path).map_err(|err| store_error(err, path))?;
    store
        .remove(username)
        .map_err(|err| store_error(err, path))?;
    writeln!(out, "removed user '{username}'").map_err(write_error)
}

pub(crate) fn handle_list(path: &Path, out: &mut impl Write) -> CliResult<()> {
    let store = CredentialStore::load(path).map_err(|err| store_error(err, path))?;
    for username in store.usernames() {
        writeln!(out, "{username}").map_err(write_error)?;
    }
    Ok(())
}

fn store_error(err: CredentialError, path: &Path) -> CliError {
    match err {
        CredentialError::AlreadyExists { username } => CliError::validation(format!(
            "user '{username}' already exists, use 'update' in place of 'add'"
        )),
        CredentialError::NotFound { username } => {
            CliError::validation(format!("user '{username}' doesn't exist"))
        }
        CredentialError::FileMissing { path } => CliError::validation(format!(
            "credential file '{}' does not exist",
            path.display()
        )),
        CredentialError::EmptyUsername
        | CredentialError::EmptyPassword
        | CredentialError::PasswordMismatch
        | CredentialError::NotInteractive => CliError::validation(err.to_string()),
        other => CliError::failure(
            anyhow::Error::new(other).context(format!("credential file '{}'", path.display())),
        ),
    }
}

fn write_error(err: std::io::Error) -> CliError {
    CliError::failure(anyhow::Error::new(err).context("failed to write output"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfs_credentials::CredentialResult;

    struct FixedPrompt(&'static str);

    impl PasswordPrompt for FixedPrompt {
        fn prompt(&self, _message: &str) -> CredentialResult<String> {
            Ok(self.0.to_string())
        }
    }

    fn output(buffer: Vec<u8>) -> String {
        String::from_utf8_lossy(&buffer).into_owned()
    }

    #[test]
    fn add_creates_missing_file_and_list_prints_users() -> Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("creds.json");
        let prompt = FixedPrompt("typed");

        let mut out = Vec::new();
        handle_add(&path, "bob", Some("pw"), &prompt, &mut out)
            .map_err(|err| err.display_message())?;
        handle_add(&path, "alice", None, &prompt, &mut out)
            .map_err(|err| err.display_message())?;
        assert!(path.exists());

        let mut listing = Vec::new();
        handle_list(&path, &mut listing).map_err(|err| err.display_message())?;
        assert_eq!(output(listing), "alice\nbob\n");

        let store = CredentialStore::load(&path)?;
        assert!(store.matches("alice", "typed")?);
        Ok(())
    }

    #[test]
    fn duplicate_add_and_missing_remove_are_validation_errors()
    -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("creds.json");
        let prompt = FixedPrompt("unused");
        let mut out = Vec::new();
        handle_add(&path, "alice", Some("pw"), &prompt, &mut out)
            .map_err(|err| err.display_message())?;

        let err = handle_add(&path, "alice", Some("pw"), &prompt, &mut out)
            .err()
            .ok_or("expected duplicate failure")?;
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("already exists"));

        handle_remove(&path, "alice", &mut out).map_err(|err| err.display_message())?;
        let err = handle_remove(&path, "alice", &mut out)
            .err()
            .ok_or("expected missing user failure")?;
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }

    #[test]
    fn update_and_list_require_existing_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("absent.json");
        let mut out = Vec::new();
        let err = handle_list(&path, &mut out)
            .err()
            .ok_or("expected missing file failure")?;
        assert_eq!(err.exit_code(), 2);
        let err = handle_update(&path, "alice", Some("pw"), &FixedPrompt(""), &mut out)
            .err()
            .ok_or("expected missing file failure")?;
        assert!(err.display_message().contains("does not exist"));
        Ok(())
    }
}
