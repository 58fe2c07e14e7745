use std::fs;

use anyhow::{Result, anyhow};
use sfs_config::{
    AuthSource, ConfigError, ListingMode, ServerConfig, TlsVersion, load_config_with,
    read_config_file,
};
use sfs_test_support::{ServedFolder, env_from};

#[test]
fn yaml_then_environment_precedence() -> Result<()> {
    let served = ServedFolder::new()?;
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("config.yml");
    fs::write(
        &config_path,
        format!(
            "folder: {}\nport: 9000\nshow-listing: false\nurl-prefix: /static\nreferrers:\n  - https://example.com\n",
            served.display_path()
        ),
    )?;

    let config = load_config_with(Some(&config_path), env_from(&[("PORT", "9100")]))?;
    assert_eq!(config.port, 9100);
    assert_eq!(config.url_prefix, "/static");
    assert_eq!(config.referrers, vec!["https://example.com".to_string()]);

    let validated = config.validate()?;
    assert_eq!(validated.policy.listing, ListingMode::AllowIndexOnly);
    assert_eq!(validated.policy.tls_min_version, TlsVersion::Tls10);
    assert_eq!(validated.auth, AuthSource::Disabled);
    assert!(validated.listener.tls.is_none());
    Ok(())
}

#[test]
fn empty_file_yields_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("empty.yml");
    fs::write(&path, "")?;
    assert_eq!(read_config_file(&path)?, ServerConfig::default());
    Ok(())
}

#[test]
fn malformed_yaml_is_a_parse_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.yml");
    fs::write(&path, "port: [not, a, port]\n")?;
    let err = read_config_file(&path)
        .err()
        .ok_or_else(|| anyhow!("expected parse failure"))?;
    assert!(matches!(err, ConfigError::Parse { .. }));
    Ok(())
}

#[test]
fn missing_folder_fails_validation() -> Result<()> {
    let config = ServerConfig {
        folder: "/definitely/not/here".to_string(),
        ..ServerConfig::default()
    };
    let err = config
        .validate()
        .err()
        .ok_or_else(|| anyhow!("expected folder failure"))?;
    assert!(matches!(err, ConfigError::Io { .. }));
    Ok(())
}

#[test]
fn tls_files_must_exist() -> Result<()> {
    let served = ServedFolder::new()?.with_file("cert.pem", "cert")?;
    let config = ServerConfig {
        folder: served.display_path(),
        tls_cert: served.join("cert.pem").display().to_string(),
        tls_key: served.join("key.pem").display().to_string(),
        ..ServerConfig::default()
    };
    let err = config
        .validate()
        .err()
        .ok_or_else(|| anyhow!("expected tls failure"))?;
    assert!(matches!(
        err,
        ConfigError::InvalidField {
            field: "tls-key",
            ..
        }
    ));
    Ok(())
}

#[test]
fn tls_enables_minimum_version() -> Result<()> {
    let served = ServedFolder::new()?
        .with_file("cert.pem", "cert")?
        .with_file("key.pem", "key")?;
    let config = ServerConfig {
        folder: served.display_path(),
        tls_cert: served.join("cert.pem").display().to_string(),
        tls_key: served.join("key.pem").display().to_string(),
        tls_min_vers: "tls12".to_string(),
        ..ServerConfig::default()
    };
    let validated = config.validate()?;
    assert_eq!(validated.policy.tls_min_version, TlsVersion::Tls12);
    assert!(validated.listener.tls.is_some());
    Ok(())
}

#[test]
fn fast_auth_builds_shared_source() -> Result<()> {
    let served = ServedFolder::new()?;
    let folder = served.display_path();
    let config = load_config_with(
        None,
        env_from(&[
            ("FOLDER", folder.as_str()),
            ("FAST_AUTH", "admin:secret"),
        ]),
    )?;
    let validated = config.validate()?;
    assert_eq!(
        validated.auth,
        AuthSource::Shared {
            username: "admin".to_string(),
            password: "secret".to_string(),
        }
    );
    Ok(())
}
