//! Error types for the Coinapult client library.

use serde_json::Value;
use thiserror::Error;

/// The main error type for all Coinapult client operations.
///
/// Signature and HMAC mismatches are deliberately absent: those are reported
/// as flags on [`VerifiedPayload`](crate::auth::VerifiedPayload) and
/// [`CallbackAuth`](crate::auth::CallbackAuth) so callers have to branch on them.
#[derive(Error, Debug)]
pub enum CoinapultError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// The server answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        body: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Coinapult API returned an error
    #[error("Coinapult API error: {0}")]
    Api(ApiError),

    /// Request parameters were rejected before anything was signed
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// Credentials, keys or client settings are unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing required credentials
    #[error("Missing credentials: signed endpoints require an API key pair or an ECC key")]
    MissingCredentials,

    /// Invalid response from the API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CoinapultError {
    /// Whether the failure happened on the wire.
    ///
    /// These are the errors a caller may choose to retry. A retry must go
    /// through the endpoint method again so that a fresh nonce and timestamp
    /// are signed.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::HttpMiddleware(_) | Self::Status { .. }
        )
    }

    /// Whether the failure is a fatal setup problem that retrying cannot fix.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::MissingCredentials | Self::Url(_)
        )
    }
}

/// Caller-fixable problems with endpoint parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A search key outside the fixed whitelist.
    #[error("Invalid search criteria '{0}'")]
    UnknownSearchCriteria(String),

    /// A search without any criteria.
    #[error("Empty search criteria")]
    EmptySearchCriteria,

    /// A field the endpoint cannot do without.
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
}

/// An error reported by the Coinapult API in the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Human-readable error message
    pub message: String,
    /// Error code, when the server supplies one
    pub code: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl ApiError {
    /// Create a new API error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Attach an error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Parse the value of an `error` member.
    ///
    /// Coinapult sends either a bare string or an object carrying `message`
    /// and optionally `code`.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(message) => Self::new(message.clone()),
            Value::Object(map) => {
                let message = map
                    .get("message")
                    .map(value_to_string)
                    .unwrap_or_else(|| value.to_string());
                let code = map.get("code").map(value_to_string);
                Self { message, code }
            }
            other => Self::new(other.to_string()),
        }
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_string() {
        let error = ApiError::from_value(&serde_json::json!("Invalid nonce"));
        assert_eq!(error.message, "Invalid nonce");
        assert!(error.code.is_none());
        assert_eq!(error.to_string(), "Invalid nonce");
    }

    #[test]
    fn test_api_error_from_object() {
        let error = ApiError::from_value(&serde_json::json!({
            "message": "Insufficient funds",
            "code": 402
        }));
        assert_eq!(error.message, "Insufficient funds");
        assert_eq!(error.code.as_deref(), Some("402"));
        assert_eq!(error.to_string(), "402: Insufficient funds");
    }

    #[test]
    fn test_error_classification() {
        let status = CoinapultError::Status {
            status: 503,
            body: "busy".to_string(),
        };
        assert!(status.is_transport());
        assert!(!status.is_configuration());

        assert!(CoinapultError::MissingCredentials.is_configuration());
        assert!(!CoinapultError::Validation(ValidationError::EmptySearchCriteria).is_transport());
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError::UnknownSearchCriteria("foo".to_string());
        assert_eq!(error.to_string(), "Invalid search criteria 'foo'");
    }
}
