use crate::models::chat::{ ChatMessage, Role };
use uuid::Uuid;

pub const DEFAULT_WELCOME: &str =
    "Welcome to the Nebula Lab. I am your AI Strategy Consultant. How can I help you navigate the Web3 landscape today?";

/// Ordered transcript of one page session.
///
/// Insertion order is chronological order is render order. Entries are never
/// removed, reordered or persisted.
#[derive(Clone, Debug)]
pub struct Conversation {
    id: String,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Starts a session seeded with a single assistant greeting.
    pub fn initialize(welcome: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: vec![ChatMessage::assistant(welcome, Vec::new())],
        }
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::initialize(DEFAULT_WELCOME)
    }
}

pub fn format_transcript(conversation: &Conversation) -> String {
    let mut result = String::new();
    for msg in conversation.messages() {
        let role_display = match msg.role() {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        result.push_str(&format!("{}: {}\n", role_display, msg.text()));
        if let Some(sources) = msg.sources() {
            for source in sources {
                result.push_str(&format!("  [{}] {}\n", source.title, source.uri));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Source;

    #[test]
    fn initialize_seeds_one_greeting() {
        let conversation = Conversation::initialize("hello there");
        assert_eq!(conversation.len(), 1);
        let seed = &conversation.messages()[0];
        assert_eq!(seed.role(), Role::Assistant);
        assert_eq!(seed.text(), "hello there");
        assert!(seed.sources().is_none());
    }

    #[test]
    fn append_keeps_insertion_order_and_duplicates() {
        let mut conversation = Conversation::default();
        conversation.append(ChatMessage::user("same"));
        conversation.append(ChatMessage::user("same"));
        conversation.append(ChatMessage::assistant("reply", Vec::new()));

        let texts: Vec<&str> = conversation.messages().iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec![DEFAULT_WELCOME, "same", "same", "reply"]);
        assert_eq!(conversation.last().map(|m| m.text()), Some("reply"));
    }

    #[test]
    fn sessions_get_distinct_ids() {
        assert_ne!(Conversation::default().id(), Conversation::default().id());
    }

    #[test]
    fn transcript_lists_sources_under_the_answer() {
        let mut conversation = Conversation::initialize("hi");
        conversation.append(ChatMessage::user("q"));
        conversation.append(
            ChatMessage::assistant("a", vec![Source { title: "Docs".into(), uri: "https://x".into() }])
        );
        assert_eq!(format_transcript(&conversation), "Assistant: hi\nUser: q\nAssistant: a\n  [Docs] https://x\n");
    }
}
