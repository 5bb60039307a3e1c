use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("API error: {code} - {message}")]
    ApiError { code: i64, message: String },

    /// A 200 response carrying `success: false`, as the wallet endpoints send
    #[error("Request rejected: {message}")]
    RequestRejected { message: String },

    /// A non-200 response whose body is not the exchange's `{code, msg}` shape.
    #[error("Malformed error response (HTTP {status}): {reason}; body: {body}")]
    ErrorResponseMalformed {
        status: u16,
        body: String,
        reason: String,
    },

    #[error("Failed to decode {field}: {reason}")]
    DeserializationError { field: String, reason: String },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),
}

impl ExchangeError {
    pub(crate) fn decode(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::DeserializationError {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// True for a well-formed exchange rejection carrying a code.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::ApiError { .. })
    }

    /// The exchange error code, if this is an exchange rejection.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::HttpError(_) | Self::NetworkError(_) | Self::Cancelled
        )
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: i64,
    msg: String,
}

/// Map a non-200 response body to an exchange error.
///
/// A body that is not `{"code": <int>, "msg": <string>}` yields
/// [`ExchangeError::ErrorResponseMalformed`] so callers can tell a broken
/// error payload apart from a genuine rejection.
pub fn classify_error_response(status: u16, body: &[u8]) -> ExchangeError {
    let text = String::from_utf8_lossy(body);
    info!(status, error_response = %text, "exchange returned an error response");

    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(err) => ExchangeError::ApiError {
            code: err.code,
            message: err.msg,
        },
        Err(e) => ExchangeError::ErrorResponseMalformed {
            status,
            body: text.into_owned(),
            reason: e.to_string(),
        },
    }
}
