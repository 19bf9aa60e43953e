use std::future::Future;

use mailform_models::contact::ContactRequest;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait DispatchService: Send + Sync + 'static {
    /// Forward the fixed contact message to the recipient of `request`.
    ///
    /// Exactly one provider call is made per invocation, nothing is retried.
    fn dispatch(
        &self,
        request: ContactRequest,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;

    /// Whether provider credentials were configured at startup.
    fn is_configured(&self) -> bool;
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Provider credentials are not configured.")]
    NotConfigured,
    #[error("The provider rejected the message with status {status}.")]
    Rejected { status: u16, message: Option<String> },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockDispatchService {
    pub fn with_dispatch(
        mut self,
        request: ContactRequest,
        result: Result<(), DispatchError>,
    ) -> Self {
        self.expect_dispatch()
            .once()
            .with(mockall::predicate::eq(request))
            .return_once(|_| Box::pin(std::future::ready(result)));
        self
    }

    pub fn with_is_configured(mut self, result: bool) -> Self {
        self.expect_is_configured().return_const(result);
        self
    }
}
