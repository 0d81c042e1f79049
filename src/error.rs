use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("invalid site URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid admin API key: {reason}")]
    InvalidKey { reason: String },
    #[error("failed to sign admin token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status}{}", message_suffix(.message))]
    Api {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response contained no {resource}")]
    EmptyCollection { resource: &'static str },
}

impl AdminError {
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            reason: reason.into(),
        }
    }

    /// HTTP status of an API failure, if this error carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status(),
            _ => None,
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|text| format!(" - {text}"))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
#[error("telemetry initialization failed: {0}")]
pub struct TelemetryError(pub String);
