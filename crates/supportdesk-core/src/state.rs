//! UI-agnostic session state types
//!
//! The chat history lives here rather than in any UI crate so that whoever
//! owns a session (the TUI's `App` today) passes it explicitly into the
//! turn pipeline.

use serde::{Deserialize, Serialize};

/// A single turn of the displayed conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only transcript for one session. Only `clear` removes turns.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_preserves_order() {
        let mut history = ChatHistory::new();
        history.push(ChatMessage::user("first"));
        history.push(ChatMessage::assistant("second"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.messages()[0].role, ChatRole::User);
        assert_eq!(history.last().unwrap().content, "second");
    }

    #[test]
    fn test_clear_empties_history() {
        let mut history = ChatHistory::new();
        history.push(ChatMessage::user("hello"));
        history.clear();

        assert!(history.is_empty());
        assert!(history.last().is_none());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
