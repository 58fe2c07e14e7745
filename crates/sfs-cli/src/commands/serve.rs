//! `serve`: load, validate and run the server.

use std::path::Path;

use sfs_config::{ConfigError, ValidatedConfig, load_config};

use crate::error::{CliError, CliResult};

pub(crate) async fn handle_serve(config_path: Option<&Path>) -> CliResult<()> {
    let config = load_validated(config_path)?;
    sfs_app::run_server(config).await.map_err(CliError::failure)
}

pub(crate) fn load_validated(config_path: Option<&Path>) -> CliResult<ValidatedConfig> {
    let config = load_config(config_path).map_err(config_error)?;
    config.validate().map_err(config_error)
}

pub(crate) fn config_error(err: ConfigError) -> CliError {
    match err {
        ConfigError::InvalidField {
            field,
            value,
            reason,
        } => match value {
            Some(value) => {
                CliError::validation(format!("invalid '{field}' value '{value}': {reason}"))
            }
            None => CliError::validation(format!("invalid '{field}': {reason}")),
        },
        ConfigError::Io {
            operation: "config.folder",
            path,
            source,
        } => CliError::validation(format!(
            "folder '{}' is not accessible: {source}",
            path.display()
        )),
        other => {
            let detail = match &other {
                ConfigError::Parse { path, .. } | ConfigError::Io { path, .. } => {
                    format!("configuration file '{}'", path.display())
                }
                ConfigError::HostResolution { host, .. } => format!("host '{host}'"),
                ConfigError::InvalidField { field, .. } => format!("field '{field}'"),
            };
            CliError::failure(anyhow::Error::new(other).context(detail))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn invalid_fields_are_validation_errors() {
        let err = config_error(ConfigError::InvalidField {
            field: "url-prefix",
            value: Some("/x/".to_string()),
            reason: "must not end with '/'",
        });
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.display_message(),
            "invalid 'url-prefix' value '/x/': must not end with '/'"
        );
    }

    #[test]
    fn unreadable_config_file_is_a_failure() {
        let err = config_error(ConfigError::Io {
            operation: "config.read",
            path: PathBuf::from("missing.yml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        });
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("missing.yml"));
    }
}
