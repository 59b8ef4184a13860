use crate::error::ChatError;
use crate::models::chat::{ ChatMessage, Role };

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Be friendly, informative, and concise in your responses.";

/// Append-only transcript sent in full with every request. Index 0 always
/// holds the system message the store was created with.
#[derive(Clone, Debug)]
pub struct ConversationStore {
    messages: Vec<ChatMessage>,
}

impl ConversationStore {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_prompt)],
        }
    }

    /// Rejects user messages whose content is blank; everything else is
    /// appended as-is.
    pub fn append(&mut self, message: ChatMessage) -> Result<(), ChatError> {
        if message.role() == Role::User && message.content().trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }
        self.messages.push(message);
        Ok(())
    }

    /// Owned copy of the transcript in insertion order.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.clone()
    }

    pub fn system_message(&self) -> &ChatMessage {
        &self.messages[0]
    }

    pub fn last(&self) -> &ChatMessage {
        &self.messages[self.messages.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

pub fn format_history_for_log(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|msg| format!("{}: {}", msg.role(), msg.content()))
        .collect::<Vec<_>>()
        .join("\n")
}
