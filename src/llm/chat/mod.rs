pub mod gemini;

use async_trait::async_trait;
use std::sync::Arc;
use super::{ LlmConfig, LlmError };
use self::gemini::GeminiChatClient;

/// One single-shot generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: Option<String>,
    /// Lets the provider ground its answer in live search results.
    pub web_search: bool,
    /// Cap on internal reasoning tokens. Passed through, never enforced locally.
    pub thinking_budget: Option<u32>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_instruction: None,
            web_search: false,
            thinking_budget: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }

    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }
}

/// A web record inside a grounding chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebReference {
    pub title: Option<String>,
    pub uri: Option<String>,
}

/// One grounding/citation entry. Only entries with a `web` record are web citations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundingChunk {
    pub web: Option<WebReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResponse {
    /// `None` when the provider returned no text parts.
    pub text: Option<String>,
    pub grounding: Vec<GroundingChunk>,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError>;

    fn name(&self) -> &str;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, LlmError> {
    let client = GeminiChatClient::from_config(config)?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_every_option() {
        let request = GenerateRequest::new("gemini-3-pro-preview", "hi")
            .with_system_instruction("persona")
            .with_web_search()
            .with_thinking_budget(4000);

        assert_eq!(request.model, "gemini-3-pro-preview");
        assert_eq!(request.system_instruction.as_deref(), Some("persona"));
        assert!(request.web_search);
        assert_eq!(request.thinking_budget, Some(4000));
    }

    #[test]
    fn new_client_requires_api_key() {
        let err = new_client(&LlmConfig::default()).err().expect("missing key must fail");
        assert_eq!(err.kind, crate::llm::LlmErrorKind::Auth);
    }
}
