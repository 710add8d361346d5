//! crates/study_assistant_core/src/chat_store.rs
//!
//! Append-only chat history plus the "request in flight" flag.

use crate::domain::{ChatMessage, ChatRole};
use chrono::Utc;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct ChatStore {
    messages: Vec<ChatMessage>,
    pending: bool,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message with a fresh id and timestamp. Messages are never edited.
    pub fn add_message(&mut self, role: ChatRole, content: impl Into<String>) -> &ChatMessage {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            content: content.into(),
            role,
            timestamp: Utc::now(),
        };
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Toggled by the caller around each remote call.
    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keeps_insertion_order() {
        let mut store = ChatStore::new();
        store.add_message(ChatRole::User, "What is osmosis?");
        store.add_message(ChatRole::Assistant, "Diffusion of water.");
        store.add_message(ChatRole::User, "Thanks");

        let contents: Vec<_> = store.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["What is osmosis?", "Diffusion of water.", "Thanks"]);
        assert_eq!(store.messages()[1].role, ChatRole::Assistant);
    }

    #[test]
    fn length_matches_calls_and_ids_are_unique() {
        let mut store = ChatStore::new();
        for i in 0..25 {
            store.add_message(ChatRole::User, format!("q{i}"));
        }
        assert_eq!(store.messages().len(), 25);

        let mut ids: Vec<_> = store.messages().iter().map(|m| m.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 25);
    }

    #[test]
    fn timestamps_are_monotonic() {
        let mut store = ChatStore::new();
        store.add_message(ChatRole::User, "a");
        store.add_message(ChatRole::Assistant, "b");
        let msgs = store.messages();
        assert!(msgs[0].timestamp <= msgs[1].timestamp);
    }

    #[test]
    fn clear_empties_history_but_not_pending_flag() {
        let mut store = ChatStore::new();
        store.add_message(ChatRole::User, "hi");
        store.set_pending(true);
        store.clear();

        assert!(store.messages().is_empty());
        assert!(store.is_pending());
        store.set_pending(false);
        assert!(!store.is_pending());
    }
}
