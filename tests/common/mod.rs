//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{ Arc, Mutex };

use strategy_lab::agent::StrategyAgent;
use strategy_lab::config::prompt::PromptConfig;
use strategy_lab::llm::chat::{
    ChatClient,
    GenerateRequest,
    GenerateResponse,
    GroundingChunk,
    WebReference,
};
use strategy_lab::llm::LlmError;
use strategy_lab::strategist::{ StrategyService, StrategySettings };

/// Replays queued replies in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<GenerateResponse, LlmError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, reply: Result<GenerateResponse, LlmError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn answer(&self, text: &str) {
        self.push(Ok(GenerateResponse { text: Some(text.to_string()), grounding: Vec::new() }));
    }

    pub fn fail(&self) {
        self.push(Err(LlmError::network("connection reset by peer")));
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("no scripted reply left")))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn web_chunk(title: &str, uri: &str) -> GroundingChunk {
    GroundingChunk {
        web: Some(WebReference { title: Some(title.to_string()), uri: Some(uri.to_string()) }),
    }
}

pub fn service(client: Arc<ScriptedClient>) -> StrategyService {
    StrategyService::new(client, Arc::new(PromptConfig::default()), StrategySettings::default())
}

pub fn agent(client: Arc<ScriptedClient>) -> Arc<StrategyAgent> {
    Arc::new(StrategyAgent::new(service(client), None))
}
