use serde::{ Serialize, Deserialize };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A web citation attached to an assistant answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// One turn of the transcript.
///
/// Fields are private so that a user turn can never carry sources; build
/// messages through [`ChatMessage::user`] and [`ChatMessage::assistant`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sources: Option<Vec<Source>>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            sources: None,
        }
    }

    /// An empty `sources` list is stored as `None`.
    pub fn assistant(text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            sources: if sources.is_empty() { None } else { Some(sources) },
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sources(&self) -> Option<&[Source]> {
        self.sources.as_deref()
    }
}
