//! Configuration loading from YAML and the process environment.
//!
//! # Design
//! - Precedence is defaults, then the YAML file, then environment variables.
//! - Environment lookup is injected so tests never touch process state.
//! - Malformed boolean or numeric environment values are logged and ignored.

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::defaults::{
    ENV_ACCESS_KEY, ENV_ALLOW_INDEX, ENV_CORS, ENV_CREDENTIALS, ENV_DEBUG, ENV_FAST_AUTH,
    ENV_FOLDER, ENV_HOST, ENV_PORT, ENV_REFERRERS, ENV_SHOW_LISTING, ENV_TLS_CERT, ENV_TLS_KEY,
    ENV_TLS_MIN_VERS, ENV_URL_PREFIX,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::ServerConfig;

/// Load configuration from an optional YAML file, applying process environment overrides.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> ConfigResult<ServerConfig> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Load configuration using a caller-supplied environment lookup.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_config_with<F>(path: Option<&Path>, env: F) -> ConfigResult<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => ServerConfig::default(),
    };
    config.apply_env(env);
    Ok(config)
}

/// Read a YAML configuration file; an empty document yields the defaults.
///
/// # Errors
///
/// Returns an error when the file cannot be read or does not match the model.
pub fn read_config_file(path: &Path) -> ConfigResult<ServerConfig> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "config.read",
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(ServerConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl ServerConfig {
    /// Overlay environment variables onto the configuration.
    ///
    /// Empty variables are treated as unset.
    pub fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|value| !value.is_empty());

        apply_bool(&mut self.cors, ENV_CORS, lookup(ENV_CORS));
        apply_bool(&mut self.debug, ENV_DEBUG, lookup(ENV_DEBUG));
        apply_bool(&mut self.allow_index, ENV_ALLOW_INDEX, lookup(ENV_ALLOW_INDEX));
        apply_bool(
            &mut self.show_listing,
            ENV_SHOW_LISTING,
            lookup(ENV_SHOW_LISTING),
        );

        if let Some(value) = lookup(ENV_PORT) {
            match value.trim().parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => warn!(key = ENV_PORT, value = %value, "ignoring invalid port value"),
            }
        }

        let strings: [(&mut String, &str); 9] = [
            (&mut self.folder, ENV_FOLDER),
            (&mut self.host, ENV_HOST),
            (&mut self.tls_cert, ENV_TLS_CERT),
            (&mut self.tls_key, ENV_TLS_KEY),
            (&mut self.tls_min_vers, ENV_TLS_MIN_VERS),
            (&mut self.url_prefix, ENV_URL_PREFIX),
            (&mut self.access_key, ENV_ACCESS_KEY),
            (&mut self.credentials, ENV_CREDENTIALS),
            (&mut self.fast_auth, ENV_FAST_AUTH),
        ];
        for (field, key) in strings {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        }

        if let Some(value) = lookup(ENV_REFERRERS) {
            self.referrers = split_list(&value);
        }
    }
}

/// Parse a boolean using the accepted spellings, case-insensitively.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn apply_bool(target: &mut bool, key: &'static str, value: Option<String>) {
    let Some(value) = value else {
        return;
    };
    match parse_bool(&value) {
        Some(parsed) => *target = parsed,
        None => warn!(key, value = %value, "ignoring invalid boolean value"),
    }
}

/// Split a comma-separated list; entries keep surrounding whitespace.
fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parse_bool_accepts_documented_spellings() {
        for value in ["1", "true", "T", "Yes", "y"] {
            assert_eq!(parse_bool(value), Some(true), "{value}");
        }
        for value in ["0", "FALSE", "f", "no", "N"] {
            assert_eq!(parse_bool(value), Some(false), "{value}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn env_overrides_defaults() -> anyhow::Result<()> {
        let config = load_config_with(
            None,
            env_from(&[
                ("PORT", "9090"),
                ("CORS", "yes"),
                ("SHOW_LISTING", "false"),
                ("REFERRERS", "http://a.example,,https://b.example"),
                ("FOLDER", "/srv"),
            ]),
        )?;
        assert_eq!(config.port, 9090);
        assert!(config.cors);
        assert!(!config.show_listing);
        assert_eq!(config.folder, "/srv");
        assert_eq!(
            config.referrers,
            vec![
                "http://a.example".to_string(),
                String::new(),
                "https://b.example".to_string()
            ]
        );
        Ok(())
    }

    #[test]
    fn referrer_entries_are_not_trimmed() {
        assert_eq!(
            split_list("http://a, http://b,"),
            vec![
                "http://a".to_string(),
                " http://b".to_string(),
                String::new()
            ]
        );
    }

    #[test]
    fn invalid_env_values_keep_previous() -> anyhow::Result<()> {
        let config = load_config_with(
            None,
            env_from(&[("PORT", "http"), ("DEBUG", "sometimes"), ("HOST", "")]),
        )?;
        assert_eq!(config.port, ServerConfig::default().port);
        assert!(!config.debug);
        assert!(config.host.is_empty());
        Ok(())
    }
}
