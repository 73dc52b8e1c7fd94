//! Per-session advisor chat history

use serde::Serialize;

use crate::models::ChatMessage;

/// Ordered user/assistant turns from completed exchanges
///
/// Turns only enter through [`Conversation::record_exchange`], which appends a
/// question and its reply together, so the log always alternates
/// user/assistant and never holds a question whose request failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a successful exchange
    pub fn record_exchange(&mut self, question: impl Into<String>, reply: impl Into<String>) {
        self.turns.reserve(2);
        self.turns.push(ChatMessage::user(question));
        self.turns.push(ChatMessage::assistant(reply));
    }

    /// Drop every turn
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.turns
    }

    /// Number of turns (two per exchange)
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of completed exchanges
    pub fn exchanges(&self) -> usize {
        self.turns.len() / 2
    }
}
