use serde::{Deserialize, Serialize};

use crate::constants::WELCOME_MESSAGE;

/// A single chat turn as the chat view keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub text: String,
    pub is_user: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: true,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn from_is_user(is_user: bool) -> Self {
        if is_user {
            Role::User
        } else {
            Role::Model
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One turn in the remote API's history format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

impl From<&ChatMessage> for Content {
    fn from(msg: &ChatMessage) -> Self {
        Content::new(Role::from_is_user(msg.is_user), msg.text.clone())
    }
}

/// Request body of the astro backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstroRequest {
    pub current_message: String,
    #[serde(default)]
    pub history: Vec<Content>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstroResponse {
    pub response: String,
}

/// Converts local history into the remote format.
///
/// The remote API rejects a history whose first turn is not `user`, so a
/// leading bot message (the welcome message) is dropped. Only the first entry
/// is inspected.
pub fn format_history(history: &[ChatMessage]) -> Vec<Content> {
    let mut formatted: Vec<Content> = history.iter().map(Content::from).collect();
    trim_leading_model(&mut formatted);
    formatted
}

/// Drops a single leading `model` turn so the history opens with `user`.
pub fn trim_leading_model(contents: &mut Vec<Content>) {
    if contents.first().map(|c| c.role) == Some(Role::Model) {
        contents.remove(0);
    }
}

/// Ordered conversation history, opened by the bot's welcome message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::bot(WELCOME_MESSAGE)],
        }
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::user(text));
    }

    pub fn push_bot(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::bot(text));
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
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
