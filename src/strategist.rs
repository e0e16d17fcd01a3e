//! Strategy query service.
//!
//! Turns one piece of user text into one assistant [`ChatMessage`]. The typed
//! layer ([`StrategyService::try_query`]) reports why a round trip failed; the
//! UI-facing layer ([`StrategyService::query`]) swaps any failure for the fixed
//! fallback text so callers always get a renderable message.

use std::sync::Arc;
use log::{ error, info, warn };
use thiserror::Error;

use crate::config::prompt::PromptConfig;
use crate::llm::chat::{ ChatClient, GenerateRequest, GroundingChunk };
use crate::llm::{ LlmError, LlmErrorKind };
use crate::models::chat::{ ChatMessage, Source };

pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_TREND_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_THINKING_BUDGET: u32 = 4000;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("provider request failed: {0}")]
    Provider(#[from] LlmError),
}

impl StrategyError {
    pub fn kind(&self) -> LlmErrorKind {
        match self {
            StrategyError::Provider(e) => e.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategySettings {
    pub chat_model: String,
    pub trend_model: String,
    /// `None` leaves the provider's default reasoning effort.
    pub thinking_budget: Option<u32>,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            trend_model: DEFAULT_TREND_MODEL.to_string(),
            thinking_budget: Some(DEFAULT_THINKING_BUDGET),
        }
    }
}

/// Stateless apart from configuration: every call is an independent round trip.
#[derive(Clone)]
pub struct StrategyService {
    client: Arc<dyn ChatClient>,
    prompts: Arc<PromptConfig>,
    settings: StrategySettings,
}

impl StrategyService {
    pub fn new(
        client: Arc<dyn ChatClient>,
        prompts: Arc<PromptConfig>,
        settings: StrategySettings
    ) -> Self {
        Self { client, prompts, settings }
    }

    pub fn prompts(&self) -> &Arc<PromptConfig> {
        &self.prompts
    }

    pub fn settings(&self) -> &StrategySettings {
        &self.settings
    }

    /// Same client and settings, different prompt texts.
    pub fn with_prompts(&self, prompts: Arc<PromptConfig>) -> Self {
        Self {
            client: Arc::clone(&self.client),
            prompts,
            settings: self.settings.clone(),
        }
    }

    fn strategy_request(&self, user_text: &str) -> GenerateRequest {
        let request = GenerateRequest::new(&self.settings.chat_model, user_text)
            .with_system_instruction(&self.prompts.system_instruction)
            .with_web_search();
        match self.settings.thinking_budget {
            Some(budget) => request.with_thinking_budget(budget),
            None => request,
        }
    }

    pub async fn try_query(&self, user_text: &str) -> Result<ChatMessage, StrategyError> {
        let request = self.strategy_request(user_text);
        let response = self.client.generate(&request).await?;

        let text = response.text
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.prompts.empty_answer.clone());
        let sources = web_sources(&response.grounding);

        info!("Strategy answer ready: {} chars, {} sources", text.chars().count(), sources.len());
        Ok(ChatMessage::assistant(text, sources))
    }

    /// Never fails; provider errors are logged and replaced by the fallback text.
    pub async fn query(&self, user_text: &str) -> ChatMessage {
        match self.try_query(user_text).await {
            Ok(message) => message,
            Err(e) => {
                error!("{} strategy query failed ({:?}): {}", self.client.name(), e.kind(), e);
                ChatMessage::assistant(self.prompts.error_fallback.clone(), Vec::new())
            }
        }
    }

    pub async fn try_trend_summary(&self) -> Result<String, StrategyError> {
        let request = GenerateRequest::new(
            &self.settings.trend_model,
            &self.prompts.trend_prompt
        ).with_web_search();
        let response = self.client.generate(&request).await?;

        Ok(
            response.text
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| self.prompts.trend_empty_answer.clone())
        )
    }

    pub async fn trend_summary(&self) -> String {
        match self.try_trend_summary().await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Trend summary failed: {}", e);
                self.prompts.trend_fallback.clone()
            }
        }
    }
}

/// Keeps grounding entries with a web record, in provider order.
pub fn web_sources(grounding: &[GroundingChunk]) -> Vec<Source> {
    grounding
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .map(|web| Source {
            title: web.title.clone().unwrap_or_default(),
            uri: web.uri.clone().unwrap_or_default(),
        })
        .collect()
}
