use thiserror::Error;

/// Classification of a failed provider round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connect failures, timeouts, body read errors.
    Network,
    /// 429
    RateLimit,
    /// 401 / 403
    Auth,
    /// Other 4xx
    InvalidRequest,
    /// 5xx
    ServerError,
    /// 2xx with a body that is not a generateContent response.
    Malformed,
}

#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Malformed, message)
    }

    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            429 => LlmErrorKind::RateLimit,
            401 | 403 => LlmErrorKind::Auth,
            500..=599 => LlmErrorKind::ServerError,
            _ => LlmErrorKind::InvalidRequest,
        };
        Self::new(kind, format!("HTTP {}: {}", status, message.into()))
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            LlmError::network(format!("Connection failed: {}", e))
        } else if e.is_decode() {
            LlmError::malformed(format!("Failed to decode response: {}", e))
        } else {
            LlmError::network(format!("Request failed: {}", e))
        }
    }
}
