//! Turns a validated configuration into a running server.

use std::sync::Arc;

use sfs_config::{AuthSource, ValidatedConfig};
use sfs_credentials::CredentialStore;
use sfs_http::{Listener, Pipeline, PipelineBuilder, build_router};
use tokio::task;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// Build the credential store named by `source`, if any.
///
/// # Errors
///
/// Returns an error when the credential file is missing or unreadable, or the
/// shared credential cannot be derived.
pub async fn load_credentials(source: &AuthSource) -> AppResult<Option<CredentialStore>> {
    match source {
        AuthSource::Disabled => Ok(None),
        AuthSource::CredentialFile(path) => {
            let store = CredentialStore::load(path)
                .map_err(|err| AppError::credentials("credentials.load", err))?;
            info!(path = %path.display(), users = store.len(), "credential file loaded");
            Ok(Some(store))
        }
        AuthSource::Shared { username, password } => {
            let username = username.clone();
            let password = password.clone();
            let store =
                task::spawn_blocking(move || CredentialStore::shared(&username, &password))
                    .await
                    .map_err(|source| AppError::Task {
                        operation: "credentials.shared",
                        source,
                    })?
                    .map_err(|err| AppError::credentials("credentials.shared", err))?;
            info!("shared credential enabled");
            Ok(Some(store))
        }
    }
}

/// Assemble the request pipeline for `config`.
///
/// # Errors
///
/// Returns an error when credentials cannot be loaded.
pub async fn build_pipeline(config: &ValidatedConfig) -> AppResult<Pipeline> {
    let mut builder =
        PipelineBuilder::new(&config.policy, config.folder.clone()).log_requests(config.debug);
    if let Some(store) = load_credentials(&config.auth).await? {
        builder = builder.with_credentials(Arc::new(store));
    }
    Ok(builder.build())
}

/// Serve `config.folder` until shutdown.
///
/// # Errors
///
/// Returns an error if credentials, TLS material, the bind address, or the
/// listener fail.
pub async fn run_server(config: ValidatedConfig) -> AppResult<()> {
    if config.debug {
        info!(config = %config.raw.describe(), "effective configuration");
    } else {
        debug!(config = %config.raw.describe(), "effective configuration");
    }

    let pipeline = build_pipeline(&config).await?;
    info!(
        folder = %config.folder.display(),
        listing = %config.policy.listing,
        stages = ?pipeline.stage_names(),
        "pipeline ready"
    );

    let listener = Listener::select(
        config.listener.tls.as_ref(),
        config.policy.tls_min_version,
    )
    .map_err(|err| AppError::server("listener.select", err))?;
    let addr = config
        .listener
        .bind_addr()
        .map_err(|err| AppError::config("listener.bind_addr", err))?;

    listener
        .serve(addr, build_router(Arc::new(pipeline)))
        .await
        .map_err(|err| AppError::server("listener.serve", err))?;
    info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfs_config::ServerConfig;
    use sfs_test_support::ServedFolder;

    fn validated(
        folder: &ServedFolder,
        configure: impl FnOnce(&mut ServerConfig),
    ) -> anyhow::Result<ValidatedConfig> {
        let mut config = ServerConfig {
            folder: folder.display_path(),
            ..ServerConfig::default()
        };
        configure(&mut config);
        Ok(config.validate()?)
    }

    #[tokio::test]
    async fn pipeline_without_auth_has_no_auth_stage() -> anyhow::Result<()> {
        let folder = ServedFolder::new()?;
        let config = validated(&folder, |config| config.debug = true)?;
        let pipeline = build_pipeline(&config).await?;
        assert_eq!(pipeline.stage_names(), vec!["rewrite-direct", "request-log"]);
        Ok(())
    }

    #[tokio::test]
    async fn fast_auth_builds_in_memory_store() -> anyhow::Result<()> {
        let folder = ServedFolder::new()?;
        let config = validated(&folder, |config| config.fast_auth = "admin:pw".to_string())?;
        let store = load_credentials(&config.auth)
            .await?
            .ok_or_else(|| anyhow::anyhow!("expected a store"))?;
        assert!(store.path().is_none());
        assert!(store.matches("admin", "pw")?);
        let pipeline = build_pipeline(&config).await?;
        assert_eq!(pipeline.stage_names().first(), Some(&"basic-auth"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_credential_file_is_fatal() -> anyhow::Result<()> {
        let folder = ServedFolder::new()?;
        let missing = folder.join("missing.json").display().to_string();
        let config = validated(&folder, |config| config.credentials = missing)?;
        let err = build_pipeline(&config)
            .await
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected failure"))?;
        assert!(matches!(
            err,
            AppError::Credentials {
                source: sfs_credentials::CredentialError::FileMissing { .. },
                ..
            }
        ));
        Ok(())
    }
}
