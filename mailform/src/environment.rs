//! Wiring of the concrete service implementations.

use std::sync::Arc;

use mailform_config::Config;
use mailform_core_dispatch_impl::{DispatchServiceConfig, DispatchServiceImpl};
use mailform_extern_impl::{
    http::HttpClient,
    sendgrid::{SendGridApiServiceConfig, SendGridApiServiceImpl},
};
use mailform_models::credentials::ProviderCredentials;
use tracing::{error, info};

pub type SendGrid = SendGridApiServiceImpl;
pub type Dispatch = DispatchServiceImpl<SendGrid>;
pub type RestServer = mailform_api_rest::RestServer<Dispatch>;

/// Read the provider credentials once.
///
/// A missing credential is logged but does not prevent startup, the dispatch
/// endpoint reports the misconfiguration to its clients instead.
pub fn credentials() -> Option<Arc<ProviderCredentials>> {
    match mailform_config::load_credentials() {
        Ok(credentials) => {
            info!(sender = %credentials.sender, "Loaded SendGrid credentials");
            Some(credentials.into())
        }
        Err(err) => {
            error!("CRITICAL: SendGrid environment variables are not configured: {err}");
            None
        }
    }
}

pub fn sendgrid(config: &Config) -> anyhow::Result<SendGrid> {
    let sendgrid_config =
        SendGridApiServiceConfig::new(config.sendgrid.send_endpoint_override.clone())?;
    Ok(SendGridApiServiceImpl::new(sendgrid_config, HttpClient::new()?))
}

pub fn dispatch(
    config: &Config,
    credentials: Option<Arc<ProviderCredentials>>,
) -> anyhow::Result<Dispatch> {
    Ok(DispatchServiceImpl::new(
        sendgrid(config)?,
        DispatchServiceConfig {
            credentials,
            mask_provider_auth_errors: config.dispatch.mask_provider_auth_errors,
        },
    ))
}

pub fn rest_server(config: &Config) -> anyhow::Result<RestServer> {
    dispatch(config, credentials()).map(RestServer::new)
}
