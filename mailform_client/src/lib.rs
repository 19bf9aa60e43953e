//! The contact form client.
//!
//! [`FormClient`] owns the two form fields and the submission lifecycle
//! `Idle -> Loading -> Success | Error`. A submission sends exactly one request
//! to the dispatch endpoint and gives up after a bounded wait.

use std::{sync::Arc, time::Duration};

use mailform_models::{
    dispatch::{DispatchResult, MessageBody},
    email_address::EmailAddress,
};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub const FALLBACK_MESSAGE: &str = "Something went wrong.";
pub const TIMEOUT_MESSAGE: &str =
    "Request timed out. The server may be busy or misconfigured. Please try again later.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// A snapshot of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub name: String,
    pub email: String,
    pub status: FormStatus,
    /// The success or error message shown below the form, empty while idle
    /// or loading.
    pub message: String,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("A submission is already in progress.")]
    AlreadyLoading,
    #[error(transparent)]
    Invalid(#[from] FormValidationError),
    #[error("{}", TIMEOUT_MESSAGE)]
    TimedOut,
    #[error("{0}")]
    Transport(#[source] reqwest::Error),
    #[error("{}", .0.message)]
    Rejected(DispatchResult),
    #[error("The submission was interrupted.")]
    Interrupted,
}

/// The checks a browser performs before letting a form with a `required`
/// text field and a `required` `type=email` field submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormValidationError {
    #[error("Please fill in your name.")]
    MissingName,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

#[derive(Debug, Clone)]
pub struct FormClient {
    http: reqwest::Client,
    endpoint: Arc<Url>,
    timeout: Duration,
    state: Arc<Mutex<FormState>>,
}

impl FormClient {
    pub fn new(http: reqwest::Client, endpoint: Url) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
            state: Default::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn state(&self) -> FormState {
        self.state.lock().await.clone()
    }

    pub async fn set_name(&self, name: impl Into<String>) {
        self.state.lock().await.name = name.into();
    }

    pub async fn set_email(&self, email: impl Into<String>) {
        self.state.lock().await.email = email.into();
    }

    /// Submit the current field values.
    ///
    /// Does nothing while another submission of this form is still loading,
    /// and does not touch the network if the fields are invalid. Dropping the
    /// returned future does not cancel the request, which still settles the
    /// form state once it completes or times out.
    pub async fn submit(&self) -> Result<DispatchResult, SubmitError> {
        let payload = {
            let mut state = self.state.lock().await;
            if state.status == FormStatus::Loading {
                debug!("Ignoring submit while loading");
                return Err(SubmitError::AlreadyLoading);
            }
            validate(&state.name, &state.email)?;

            state.status = FormStatus::Loading;
            state.message.clear();
            Payload {
                name: state.name.clone(),
                email: state.email.clone(),
            }
        };

        // The exchange runs on its own task, so the form leaves `Loading` even
        // if the caller stops polling this future.
        let task = tokio::spawn({
            let this = self.clone();
            async move {
                let result = this.send(&payload).await;
                this.finish(&result).await;
                result
            }
        });

        match task.await {
            Ok(result) => result,
            Err(err) => {
                let result = Err(SubmitError::Interrupted);
                self.finish(&result).await;
                if err.is_panic() {
                    std::panic::resume_unwind(err.into_panic());
                }
                result
            }
        }
    }

    async fn finish(&self, result: &Result<DispatchResult, SubmitError>) {
        let mut state = self.state.lock().await;
        match result {
            Ok(response) => {
                state.status = FormStatus::Success;
                state.message.clone_from(&response.message);
                state.name.clear();
                state.email.clear();
            }
            Err(err) => {
                warn!("Submission failed: {err}");
                state.status = FormStatus::Error;
                state.message = err.to_string();
            }
        }
    }

    async fn send(&self, payload: &Payload) -> Result<DispatchResult, SubmitError> {
        let exchange = async {
            let response = self
                .http
                .post((*self.endpoint).clone())
                .json(payload)
                .send()
                .await
                .map_err(SubmitError::Transport)?;
            let status = response.status();
            let body = response
                .json::<MessageBody>()
                .await
                .map_err(SubmitError::Transport)?;
            Ok::<_, SubmitError>(DispatchResult::from_response(status.as_u16(), body))
        };

        // Dropping the exchange on timeout aborts the request, and the timer
        // is dropped together with the exchange on every other path.
        let result = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| SubmitError::TimedOut)??;

        if result.success {
            Ok(result)
        } else if result.message.is_empty() {
            Err(SubmitError::Rejected(DispatchResult {
                message: FALLBACK_MESSAGE.into(),
                ..result
            }))
        } else {
            Err(SubmitError::Rejected(result))
        }
    }
}

pub fn validate(name: &str, email: &str) -> Result<(), FormValidationError> {
    if name.is_empty() {
        return Err(FormValidationError::MissingName);
    }
    email
        .parse::<EmailAddress>()
        .map(|_| ())
        .map_err(|_| FormValidationError::InvalidEmail)
}

#[derive(Serialize)]
struct Payload {
    name: String,
    email: String,
}
