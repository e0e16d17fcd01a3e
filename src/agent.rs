use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use log::{ error, info };
use tokio::sync::RwLock;

use crate::cli::Args;
use crate::config::prompt::{ self, PromptError };
use crate::llm::chat::{ new_client as new_chat_client, ChatClient };
use crate::llm::LlmConfig;
use crate::session::ChatSession;
use crate::strategist::{ StrategyService, StrategySettings };

/// Process-wide state shared by every connection and HTTP handler.
///
/// The lock only guards swapping in reloaded prompts; queries run on a cloned
/// service snapshot, so no lock is held across a network round trip.
pub struct StrategyAgent {
    service: RwLock<StrategyService>,
    prompts_path: Option<PathBuf>,
}

impl StrategyAgent {
    pub fn new(service: StrategyService, prompts_path: Option<PathBuf>) -> Self {
        Self { service: RwLock::new(service), prompts_path }
    }

    pub async fn from_args(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let llm_config = LlmConfig {
            api_key: Some(args.api_key.clone()).filter(|k| !k.is_empty()),
            base_url: args.base_url.clone(),
            request_timeout: args.request_timeout(),
        };
        let client: Arc<dyn ChatClient> = new_chat_client(&llm_config)?;
        info!(
            "Chat client configured: Provider={}, BaseURL={}",
            client.name(),
            llm_config.base_url_or_default()
        );

        let settings = StrategySettings {
            chat_model: args.chat_model.clone(),
            trend_model: args.trend_model.clone(),
            thinking_budget: Some(args.thinking_budget).filter(|b| *b > 0),
        };
        info!(
            "Strategy models: chat={} trend={} thinking_budget={:?}",
            settings.chat_model,
            settings.trend_model,
            settings.thinking_budget
        );

        let prompts = prompt::load_prompts_or_default(args.prompts_path.as_deref())?;
        let prompts_path = args.prompts_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self::new(StrategyService::new(client, prompts, settings), prompts_path))
    }

    pub async fn service(&self) -> StrategyService {
        self.service.read().await.clone()
    }

    /// A fresh session seeded with the current welcome text.
    pub async fn open_session(&self) -> ChatSession {
        if let Err(e) = self.reload_prompts_if_changed().await {
            error!("Failed to reload prompts: {}", e);
        }
        ChatSession::new(self.service().await)
    }

    /// Returns `true` when new prompts were swapped in.
    pub async fn reload_prompts_if_changed(&self) -> Result<bool, PromptError> {
        let Some(path) = &self.prompts_path else {
            return Ok(false);
        };

        let current = self.service.read().await.prompts().clone();
        match prompt::reload_prompts_if_changed(path, &current)? {
            Some(updated) => {
                let mut service = self.service.write().await;
                *service = service.with_prompts(updated);
                info!("Prompts successfully reloaded from {}", path.display());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
