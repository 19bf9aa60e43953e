use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "Email sent successfully! Check your inbox.";
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: name and email";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";
pub const MISCONFIGURED_MESSAGE: &str =
    "Server configuration error. Administrator has been notified.";
pub const PROVIDER_FAILURE_MESSAGE: &str =
    "Failed to send email due to an unknown SendGrid error.";
pub const UNEXPECTED_FAILURE_MESSAGE: &str = "An unexpected server error occurred.";

/// Outcome of a single dispatch, as reported to the form client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub success: bool,
    pub status: u16,
    pub message: String,
}

impl DispatchResult {
    /// The provider accepted the message.
    pub fn accepted() -> Self {
        Self {
            success: true,
            status: 202,
            message: SUCCESS_MESSAGE.into(),
        }
    }

    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            message: message.into(),
        }
    }

    /// Reconstructs a result from a response status and its `message` field.
    pub fn from_response(status: u16, body: MessageBody) -> Self {
        Self {
            success: (200..300).contains(&status),
            status,
            message: body.message.unwrap_or_default(),
        }
    }

    pub fn body(&self) -> MessageBody {
        MessageBody {
            message: Some(self.message.clone()),
        }
    }
}

/// The JSON body of every dispatch endpoint response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_serialization() {
        let body = DispatchResult::failure(400, MISSING_FIELDS_MESSAGE).body();
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"message": "Missing required fields: name and email"})
        );
    }

    #[test]
    fn from_response() {
        let body = serde_json::from_str::<MessageBody>("{}").unwrap();
        assert_eq!(
            DispatchResult::from_response(500, body),
            DispatchResult::failure(500, "")
        );

        let body = serde_json::from_str::<MessageBody>(r#"{"message": "ok"}"#).unwrap();
        let result = DispatchResult::from_response(202, body);
        assert!(result.success);
        assert_eq!(result.message, "ok");
    }
}
