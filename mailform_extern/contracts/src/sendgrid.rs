use std::future::Future;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait SendGridApiService: Send + Sync + 'static {
    /// Submit a single plain text mail to the SendGrid mail send endpoint.
    ///
    /// Provider rejections are reported as [`SendMailResponse::Rejected`],
    /// only transport level failures are returned as errors.
    fn send_mail(
        &self,
        api_key: &str,
        mail: SendGridMail,
    ) -> impl Future<Output = anyhow::Result<SendMailResponse>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendGridMail {
    pub to: SendGridAddress,
    pub from: SendGridAddress,
    pub subject: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendGridAddress {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendMailResponse {
    /// The provider answered with a 2xx status.
    Accepted,
    /// The provider answered with any other status. `message` is the first
    /// error message of the response body, if there is one.
    Rejected { status: u16, message: Option<String> },
}

#[cfg(feature = "mock")]
impl MockSendGridApiService {
    pub fn with_send_mail(
        mut self,
        api_key: String,
        mail: SendGridMail,
        result: SendMailResponse,
    ) -> Self {
        self.expect_send_mail()
            .once()
            .with(
                mockall::predicate::eq(api_key),
                mockall::predicate::eq(mail),
            )
            .return_once(move |_, _| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_send_mail_error(mut self, error: &'static str) -> Self {
        self.expect_send_mail()
            .once()
            .return_once(move |_, _| Box::pin(std::future::ready(Err(anyhow::anyhow!(error)))));
        self
    }
}
