use std::sync::Arc;

use mailform_core_dispatch_contracts::{DispatchError, DispatchService};
use mailform_extern_contracts::sendgrid::{
    SendGridAddress, SendGridApiService, SendGridMail, SendMailResponse,
};
use mailform_models::{contact::ContactRequest, credentials::ProviderCredentials};
use tracing::{error, info, warn};

pub const SENDER_NAME: &str = "Contact Form";
pub const SUBJECT: &str = "Hello there fellow user 4 dec 2025";
pub const CONTENT: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do \
                           eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim \
                           ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut \
                           aliquip ex ea commodo consequat. Duis aute irure dolor in \
                           reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla \
                           pariatur. Excepteur sint occaecat cupidatat non proident, sunt in \
                           culpa qui officia deserunt mollit anim id est laborum.";

/// Status reported instead of a masked provider authentication failure.
const MASKED_STATUS: u16 = 502;

#[derive(Debug, Clone)]
pub struct DispatchServiceImpl<SendGrid> {
    sendgrid: SendGrid,
    config: DispatchServiceConfig,
}

#[derive(Debug, Clone)]
pub struct DispatchServiceConfig {
    /// `None` if the credentials could not be loaded at startup.
    pub credentials: Option<Arc<ProviderCredentials>>,
    /// Replace provider 401/403 responses with a generic 502.
    pub mask_provider_auth_errors: bool,
}

impl<SendGrid> DispatchServiceImpl<SendGrid> {
    pub fn new(sendgrid: SendGrid, config: DispatchServiceConfig) -> Self {
        Self { sendgrid, config }
    }
}

impl<SendGrid> DispatchService for DispatchServiceImpl<SendGrid>
where
    SendGrid: SendGridApiService,
{
    async fn dispatch(&self, request: ContactRequest) -> Result<(), DispatchError> {
        let Some(credentials) = self.config.credentials.as_deref() else {
            error!("CRITICAL: SendGrid credentials are not configured on the server");
            return Err(DispatchError::NotConfigured);
        };

        let mail = SendGridMail {
            to: SendGridAddress {
                email: request.email.into_inner(),
                name: Some(request.name.into_inner()),
            },
            from: SendGridAddress {
                email: credentials.sender.as_str().into(),
                name: Some(SENDER_NAME.into()),
            },
            subject: SUBJECT.into(),
            content: CONTENT.into(),
        };

        info!("Sending request to SendGrid API");
        match self
            .sendgrid
            .send_mail(credentials.api_key.expose(), mail)
            .await?
        {
            SendMailResponse::Accepted => {
                info!("Successfully sent email via SendGrid");
                Ok(())
            }
            SendMailResponse::Rejected { status, .. }
                if self.config.mask_provider_auth_errors && matches!(status, 401 | 403) =>
            {
                warn!(status, "Masking SendGrid authentication failure as {MASKED_STATUS}");
                Err(DispatchError::Rejected {
                    status: MASKED_STATUS,
                    message: None,
                })
            }
            SendMailResponse::Rejected { status, message } => {
                Err(DispatchError::Rejected { status, message })
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.config.credentials.is_some()
    }
}

#[cfg(test)]
mod tests {
    use mailform_extern_contracts::sendgrid::MockSendGridApiService;
    use mailform_models::credentials::ApiKey;
    use mailform_utils::assert_matches;

    use super::*;

    #[tokio::test]
    async fn ok() {
        // Arrange
        let sendgrid = MockSendGridApiService::new().with_send_mail(
            "SG.test".into(),
            expected_mail(),
            SendMailResponse::Accepted,
        );

        let sut = DispatchServiceImpl::new(sendgrid, config(false));

        // Act
        let result = sut.dispatch(request()).await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn not_configured() {
        // Arrange
        let sut = DispatchServiceImpl::new(
            MockSendGridApiService::new(),
            DispatchServiceConfig {
                credentials: None,
                mask_provider_auth_errors: false,
            },
        );

        // Act
        let result = sut.dispatch(request()).await;

        // Assert
        assert!(!sut.is_configured());
        assert_matches!(result, Err(DispatchError::NotConfigured));
    }

    #[tokio::test]
    async fn rejected() {
        // Arrange
        let sendgrid = MockSendGridApiService::new().with_send_mail(
            "SG.test".into(),
            expected_mail(),
            SendMailResponse::Rejected {
                status: 400,
                message: Some("The from address does not match a verified Sender Identity.".into()),
            },
        );

        let sut = DispatchServiceImpl::new(sendgrid, config(true));

        // Act
        let result = sut.dispatch(request()).await;

        // Assert
        assert_matches!(
            result,
            Err(DispatchError::Rejected { status: 400, message: Some(message) })
                if message == "The from address does not match a verified Sender Identity."
        );
    }

    #[tokio::test]
    async fn auth_failure_forwarded() {
        // Arrange
        let sendgrid = MockSendGridApiService::new().with_send_mail(
            "SG.test".into(),
            expected_mail(),
            SendMailResponse::Rejected {
                status: 401,
                message: Some("invalid api key".into()),
            },
        );

        let sut = DispatchServiceImpl::new(sendgrid, config(false));

        // Act
        let result = sut.dispatch(request()).await;

        // Assert
        assert_matches!(
            result,
            Err(DispatchError::Rejected { status: 401, message: Some(message) })
                if message == "invalid api key"
        );
    }

    #[tokio::test]
    async fn auth_failure_masked() {
        // Arrange
        let sendgrid = MockSendGridApiService::new().with_send_mail(
            "SG.test".into(),
            expected_mail(),
            SendMailResponse::Rejected {
                status: 403,
                message: Some("access forbidden".into()),
            },
        );

        let sut = DispatchServiceImpl::new(sendgrid, config(true));

        // Act
        let result = sut.dispatch(request()).await;

        // Assert
        assert_matches!(
            result,
            Err(DispatchError::Rejected {
                status: 502,
                message: None
            })
        );
    }

    #[tokio::test]
    async fn transport_error() {
        // Arrange
        let sendgrid = MockSendGridApiService::new().with_send_mail_error("connection refused");

        let sut = DispatchServiceImpl::new(sendgrid, config(false));

        // Act
        let result = sut.dispatch(request()).await;

        // Assert
        assert_matches!(result, Err(DispatchError::Other(err)) if err.to_string() == "connection refused");
    }

    fn config(mask_provider_auth_errors: bool) -> DispatchServiceConfig {
        DispatchServiceConfig {
            credentials: Some(Arc::new(ProviderCredentials {
                api_key: ApiKey::new("SG.test"),
                sender: "contact@example.com".parse().unwrap(),
            })),
            mask_provider_auth_errors,
        }
    }

    fn request() -> ContactRequest {
        ContactRequest::from_fields(
            Some("Max Mustermann".into()),
            Some("max.mustermann@example.de".into()),
        )
        .unwrap()
    }

    fn expected_mail() -> SendGridMail {
        SendGridMail {
            to: SendGridAddress {
                email: "max.mustermann@example.de".into(),
                name: Some("Max Mustermann".into()),
            },
            from: SendGridAddress {
                email: "contact@example.com".into(),
                name: Some("Contact Form".into()),
            },
            subject: SUBJECT.into(),
            content: CONTENT.into(),
        }
    }
}
