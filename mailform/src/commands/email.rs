use anyhow::{anyhow, Context};
use clap::Subcommand;
use mailform_config::Config;
use mailform_core_dispatch_contracts::{DispatchError, DispatchService};
use mailform_models::contact::ContactRequest;

use crate::environment;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Send the contact form message directly through SendGrid
    Test { name: String, email: String },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { name, email } => test(config, name, email).await,
        }
    }
}

async fn test(config: Config, name: String, email: String) -> anyhow::Result<()> {
    let credentials = mailform_config::load_credentials()
        .context("SendGrid credentials are required to send a test email")?;
    let dispatch = environment::dispatch(&config, Some(credentials.into()))?;

    let request = ContactRequest::from_fields(Some(name), Some(email))
        .ok_or_else(|| anyhow!("Name and email must not be empty"))?;

    match dispatch.dispatch(request).await {
        Ok(()) => {
            println!("SendGrid accepted the email");
            Ok(())
        }
        Err(DispatchError::Rejected { status, message }) => Err(anyhow!(
            "SendGrid rejected the email with status {status}: {}",
            message.as_deref().unwrap_or("no error message")
        )),
        Err(err) => Err(err.into()),
    }
}
