use serde_json::Value;
use thiserror::Error;

/// Responses from the backend are truncated to this many characters when embedded in an error.
const MAX_ERROR_BODY_LEN: usize = 300;

#[derive(Debug, Error)]
pub enum MerchantApiError {
    #[error("Could not initialize merchant client: {0}")]
    Initialization(String),
    #[error("Invalid merchant base URL '{0}': {1}")]
    InvalidBaseUrl(String, String),
    #[error("Request to merchant backend failed: {0}")]
    RequestError(String),
    #[error("Could not deserialize merchant response: {0}")]
    JsonError(String),
    #[error("{operation} failed. Error {status} at {uri}. {message}")]
    QueryError { operation: &'static str, status: u16, uri: String, code: Option<u32>, message: String },
    #[error("Merchant response to {0} is missing the '{1}' field")]
    MissingField(&'static str, &'static str),
}

impl MerchantApiError {
    /// Builds a [`MerchantApiError::QueryError`] from a non-2xx response body. If the body is JSON carrying the
    /// backend's numeric `code` field, the code is extracted so that callers can match on it instead of scraping
    /// the error text.
    pub(crate) fn query_error(operation: &'static str, status: u16, uri: &str, body: &str) -> Self {
        let code = serde_json::from_str::<Value>(body).ok().and_then(|v| v["code"].as_u64()).map(|c| c as u32);
        let message = body.chars().take(MAX_ERROR_BODY_LEN).collect();
        Self::QueryError { operation, status, uri: uri.to_string(), code, message }
    }

    /// The HTTP status of the failed call, if this error came from a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::QueryError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend's structured error code, if the error body was JSON and carried one.
    pub fn backend_code(&self) -> Option<u32> {
        match self {
            Self::QueryError { code, .. } => *code,
            _ => None,
        }
    }

    /// Case-insensitive substring check against the (truncated) response body. Only a fallback for backends that
    /// return non-JSON error bodies; prefer [`Self::backend_code`].
    pub fn mentions(&self, needle: &str) -> bool {
        match self {
            Self::QueryError { message, .. } => message.to_lowercase().contains(&needle.to_lowercase()),
            _ => false,
        }
    }
}
