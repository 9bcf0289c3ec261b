use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication rejected by the assistant service")]
    Authentication,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("assistant service returned {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("file read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no API key configured")]
    MissingCredential,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl ApiError {
    /// Map a non-success response to an error kind, preferring the service's
    /// own `error.message` over the raw body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| body.to_string());

        match status.as_u16() {
            401 | 403 => ApiError::Authentication,
            404 => ApiError::NotFound(message),
            code => ApiError::Remote {
                status: code,
                message,
            },
        }
    }
}
