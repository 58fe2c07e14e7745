//! Interactive password entry with confirmation.

use std::io::{self, IsTerminal};

use crate::error::{CredentialError, CredentialResult};

const NEW_PASSWORD: &str = "New password:";
const CONFIRM_PASSWORD: &str = "Confirm password:";

/// Source of masked password input.
pub trait PasswordPrompt {
    /// Show `message` and read one masked line.
    ///
    /// # Errors
    ///
    /// Returns an error when input cannot be read.
    fn prompt(&self, message: &str) -> CredentialResult<String>;
}

/// Prompt reading from the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn prompt(&self, message: &str) -> CredentialResult<String> {
        if !io::stdin().is_terminal() {
            return Err(CredentialError::NotInteractive);
        }
        rpassword::prompt_password(format!("{message} "))
            .map_err(|source| CredentialError::Prompt { source })
    }
}

/// Use `supplied` when non-empty, otherwise prompt twice for a new password.
///
/// # Errors
///
/// Returns [`CredentialError::EmptyPassword`] for an empty entry and
/// [`CredentialError::PasswordMismatch`] when the confirmation differs.
pub fn resolve_password(
    supplied: Option<&str>,
    prompt: &dyn PasswordPrompt,
) -> CredentialResult<String> {
    if let Some(password) = supplied.filter(|value| !value.is_empty()) {
        return Ok(password.to_string());
    }
    let password = prompt.prompt(NEW_PASSWORD)?;
    if password.is_empty() {
        return Err(CredentialError::EmptyPassword);
    }
    let confirmation = prompt.prompt(CONFIRM_PASSWORD)?;
    if password != confirmation {
        return Err(CredentialError::PasswordMismatch);
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct Scripted(RefCell<VecDeque<&'static str>>);

    impl Scripted {
        fn new(answers: &[&'static str]) -> Self {
            Self(RefCell::new(answers.iter().copied().collect()))
        }
    }

    impl PasswordPrompt for Scripted {
        fn prompt(&self, _message: &str) -> CredentialResult<String> {
            self.0
                .borrow_mut()
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| CredentialError::Prompt {
                    source: io::Error::other("script exhausted"),
                })
        }
    }

    #[test]
    fn supplied_password_skips_prompt() -> anyhow::Result<()> {
        let prompt = Scripted::new(&[]);
        assert_eq!(resolve_password(Some("pw"), &prompt)?, "pw");
        Ok(())
    }

    #[test]
    fn prompted_password_requires_confirmation() -> anyhow::Result<()> {
        let prompt = Scripted::new(&["secret", "secret"]);
        assert_eq!(resolve_password(None, &prompt)?, "secret");

        let prompt = Scripted::new(&["secret", "other"]);
        assert!(matches!(
            resolve_password(Some(""), &prompt),
            Err(CredentialError::PasswordMismatch)
        ));

        let prompt = Scripted::new(&[""]);
        assert!(matches!(
            resolve_password(None, &prompt),
            Err(CredentialError::EmptyPassword)
        ));
        Ok(())
    }
}
