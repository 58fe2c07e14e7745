//! Filesystem and environment fixtures.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Temporary directory populated with files to serve; removed on drop.
#[derive(Debug)]
pub struct ServedFolder {
    root: TempDir,
}

impl ServedFolder {
    /// Create an empty temporary folder.
    ///
    /// # Errors
    ///
    /// Returns an error when the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let root = tempfile::tempdir().context("failed to create served folder")?;
        Ok(Self { root })
    }

    /// Write `contents` to `relative`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error when the file or its parents cannot be written.
    pub fn with_file(self, relative: &str, contents: impl AsRef<[u8]>) -> Result<Self> {
        let target = self.root.path().join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&target, contents)
            .with_context(|| format!("failed to write {}", target.display()))?;
        Ok(self)
    }

    /// Create an empty directory at `relative`.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub fn with_dir(self, relative: &str) -> Result<Self> {
        let target = self.root.path().join(relative);
        fs::create_dir_all(&target)
            .with_context(|| format!("failed to create {}", target.display()))?;
        Ok(self)
    }

    /// Root of the folder.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Absolute path of an entry inside the folder.
    #[must_use]
    pub fn join(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Root path rendered as a string, as configuration expects.
    #[must_use]
    pub fn display_path(&self) -> String {
        self.root.path().display().to_string()
    }
}

/// Build an environment lookup from literal pairs.
#[must_use]
pub fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}
