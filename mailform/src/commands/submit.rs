use anyhow::bail;
use mailform_client::FormClient;
use mailform_config::{Config, Duration};
use mailform_utils::Apply;
use url::Url;

/// Fill in the contact form and submit it once.
pub async fn submit(
    config: Config,
    name: String,
    email: String,
    endpoint: Option<Url>,
    timeout: Option<Duration>,
) -> anyhow::Result<()> {
    let client = FormClient::new(
        reqwest::Client::new(),
        endpoint.unwrap_or(config.client.endpoint),
    )
    .with_timeout(config.client.timeout.into())
    .apply_map(timeout, |client, timeout| client.with_timeout(timeout.into()));
    client.set_name(name).await;
    client.set_email(email).await;

    let result = client.submit().await;
    let state = client.state().await;

    match result {
        Ok(result) => {
            println!("{} ({})", state.message, result.status);
            Ok(())
        }
        Err(err) => bail!("{err}"),
    }
}
