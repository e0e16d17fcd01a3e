use log::{ debug, info };
use thiserror::Error;

use crate::history::Conversation;
use crate::models::chat::ChatMessage;
use crate::strategist::StrategyService;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("message is empty")]
    EmptyInput,
}

/// One page session: its transcript plus the service answering it.
///
/// `submit` borrows the session mutably, so a session never has two exchanges
/// in flight and replies append in submission order.
pub struct ChatSession {
    conversation: Conversation,
    service: StrategyService,
}

impl ChatSession {
    pub fn new(service: StrategyService) -> Self {
        let conversation = Conversation::initialize(service.prompts().welcome.clone());
        Self { conversation, service }
    }

    pub fn id(&self) -> &str {
        self.conversation.id()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Completed exchanges; the seed greeting is not one.
    pub fn exchanges(&self) -> usize {
        self.conversation.len().saturating_sub(1) / 2
    }

    /// Runs one exchange: user turn, query, assistant turn.
    ///
    /// Blank input is rejected before anything is appended. Provider failures
    /// still append an assistant message carrying the fallback text.
    pub async fn submit(&mut self, text: &str) -> Result<ChatMessage, SubmitError> {
        if text.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        self.conversation.append(ChatMessage::user(text));
        debug!("Session {} sending exchange #{}", self.id(), self.exchanges() + 1);

        let reply = self.service.query(text).await;
        self.conversation.append(reply.clone());

        info!(
            "Session {} completed exchange, transcript now {} messages",
            self.id(),
            self.conversation.len()
        );
        Ok(reply)
    }
}
