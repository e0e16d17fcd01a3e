pub mod chat;
pub mod error;

pub use error::{ LlmError, LlmErrorKind };

use std::time::Duration;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Reqwest client timeout. `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
}

impl LlmConfig {
    pub fn base_url_or_default(&self) -> String {
        self.base_url
            .as_deref()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .unwrap_or(GEMINI_API_BASE)
            .trim_end_matches('/')
            .to_string()
    }
}
