use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

use anyhow::Context;
use config::{File, FileFormat};
use mailform_models::{
    credentials::{ApiKey, ProviderCredentials},
    email_address::EmailAddress,
};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub use duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Colon separated list of additional config files.
pub const CONFIG_PATHS_ENV: &str = "MAILFORM_CONFIG";

pub const API_KEY_ENV: &str = "SENDGRID_API_KEY";
pub const SENDER_EMAIL_ENV: &str = "SENDGRID_SENDER_EMAIL";

/// Load the default config file followed by the files listed in
/// `MAILFORM_CONFIG`.
pub fn load() -> anyhow::Result<Config> {
    let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_PATH)];
    if let Some(extra) = std::env::var_os(CONFIG_PATHS_ENV) {
        paths.extend(std::env::split_paths(&extra));
    }
    load_paths(&paths)
}

pub fn load_paths(paths: &[impl AsRef<Path>]) -> anyhow::Result<Config> {
    load_with_overrides(paths, &[])
}

/// Load the given files, then apply `overrides` (inline TOML snippets) on top.
pub fn load_with_overrides(
    paths: &[impl AsRef<Path>],
    overrides: &[&str],
) -> anyhow::Result<Config> {
    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?;

    overrides
        .iter()
        .fold(builder, |builder, &content| {
            builder.add_source(File::from_str(content, FileFormat::Toml))
        })
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

/// Read the provider credentials from the process environment.
pub fn load_credentials() -> Result<ProviderCredentials, CredentialsError> {
    credentials_from(|key| std::env::var(key).ok())
}

/// Build the provider credentials from `lookup`, treating empty values as
/// missing.
pub fn credentials_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ProviderCredentials, CredentialsError> {
    let get = |key: &'static str| {
        lookup(key)
            .filter(|value| !value.is_empty())
            .ok_or(CredentialsError::Missing(key))
    };

    let api_key = get(API_KEY_ENV)?;
    let sender = get(SENDER_EMAIL_ENV)?;
    let sender = sender
        .parse::<EmailAddress>()
        .map_err(|_| CredentialsError::InvalidSender(sender))?;

    Ok(ProviderCredentials {
        api_key: ApiKey::new(api_key),
        sender,
    })
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("The environment variable {0} is not set.")]
    Missing(&'static str),
    #[error("The sender email address {0:?} is invalid.")]
    InvalidSender(String),
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    #[serde(default)]
    pub sendgrid: SendGridConfig,
    pub dispatch: DispatchConfig,
    pub client: ClientConfig,
    pub sentry: Option<SentryConfig>,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Default, Deserialize)]
pub struct SendGridConfig {
    pub send_endpoint_override: Option<Url>,
}

#[derive(Debug, Deserialize)]
pub struct DispatchConfig {
    pub mask_provider_auth_errors: bool,
}

#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    pub endpoint: Url,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct SentryConfig {
    pub dsn: Url,
}
