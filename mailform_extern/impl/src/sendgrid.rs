use std::sync::Arc;

use anyhow::Context;
use mailform_extern_contracts::sendgrid::{
    SendGridAddress, SendGridApiService, SendGridMail, SendMailResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use url::Url;

use crate::http::HttpClient;

/// https://www.twilio.com/docs/sendgrid/api-reference/mail-send/mail-send
const SEND_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone)]
pub struct SendGridApiServiceImpl {
    config: SendGridApiServiceConfig,
    http: HttpClient,
}

#[derive(Debug, Clone)]
pub struct SendGridApiServiceConfig {
    send_endpoint: Arc<Url>,
}

impl SendGridApiServiceConfig {
    pub fn new(send_endpoint_override: Option<Url>) -> anyhow::Result<Self> {
        let send_endpoint = match send_endpoint_override {
            Some(url) => url,
            None => SEND_ENDPOINT
                .parse()
                .context("Failed to parse sendgrid send endpoint")?,
        };
        Ok(Self {
            send_endpoint: send_endpoint.into(),
        })
    }
}

impl SendGridApiServiceImpl {
    pub fn new(config: SendGridApiServiceConfig, http: HttpClient) -> Self {
        Self { config, http }
    }
}

impl SendGridApiService for SendGridApiServiceImpl {
    async fn send_mail(
        &self,
        api_key: &str,
        mail: SendGridMail,
    ) -> anyhow::Result<SendMailResponse> {
        let response = self
            .http
            .post((*self.config.send_endpoint).clone())
            .bearer_auth(api_key)
            .json(&MailSendRequest::from(&mail))
            .send()
            .await
            .context("Failed to send sendgrid mail send request")?;

        let status = response.status();
        info!(%status, "Received response from SendGrid");

        if status.is_success() {
            return Ok(SendMailResponse::Accepted);
        }

        let body = response.bytes().await.unwrap_or_default();
        let error_body = parse_error_body(&body);
        match &error_body {
            Some(error_body) => error!(
                status = status.as_u16(),
                "SendGrid API error: {}",
                serde_json::to_string_pretty(error_body).unwrap_or_default()
            ),
            None => error!(
                status = status.as_u16(),
                "SendGrid API error with unparseable body: {:?}",
                String::from_utf8_lossy(&body)
            ),
        }

        Ok(SendMailResponse::Rejected {
            status: status.as_u16(),
            message: error_body.and_then(ErrorBody::first_message),
        })
    }
}

/// Parse a SendGrid error response body.
///
/// Bodies that are not valid JSON of the expected shape yield `None`.
fn parse_error_body(body: &[u8]) -> Option<ErrorBody> {
    serde_json::from_slice(body).ok()
}

#[derive(Serialize)]
struct MailSendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    content: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
    subject: &'a str,
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

impl<'a> From<&'a SendGridAddress> for Address<'a> {
    fn from(value: &'a SendGridAddress) -> Self {
        Self {
            email: &value.email,
            name: value.name.as_deref(),
        }
    }
}

impl<'a> From<&'a SendGridMail> for MailSendRequest<'a> {
    fn from(value: &'a SendGridMail) -> Self {
        Self {
            personalizations: [Personalization {
                to: [(&value.to).into()],
                subject: &value.subject,
            }],
            from: (&value.from).into(),
            content: [Content {
                content_type: "text/plain",
                value: &value.content,
            }],
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    help: Option<serde_json::Value>,
}

impl ErrorBody {
    fn first_message(self) -> Option<String> {
        self.errors
            .into_iter()
            .next()
            .and_then(|entry| entry.message)
            .filter(|message| !message.is_empty())
    }
}
