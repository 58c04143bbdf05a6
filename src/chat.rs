//! Chat assistant transcript.
//!
//! Strictly append-only. A send appends the user message immediately and
//! marks the session as typing until the reply arrives; only one send may be
//! in flight. The transcript is independent of analysis resets.

use serde::{Deserialize, Serialize};

use crate::backend::AnalysisBackend;

/// First entry of every transcript.
pub const GREETING: &str =
    "Hello! I am DataQualityAI. Analyze a file, then ask me anything about it.";

/// Indicator text while a reply is pending.
pub const TYPING_INDICATOR: &str = "AI is thinking...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Ai,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("a reply is still pending")]
    ReplyPending,
}

/// Proof that a send began; exchanged for the reply.
#[derive(Debug, PartialEq, Eq)]
pub struct ChatTicket {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    typing: bool,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::ai(GREETING)],
            typing: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Append the user's message and mark a reply as pending.
    ///
    /// Whitespace-only input is refused. The message is sent as typed.
    pub fn begin_send(&mut self, input: &str) -> Result<ChatTicket, ChatError> {
        if input.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.typing {
            return Err(ChatError::ReplyPending);
        }
        self.messages.push(ChatMessage::user(input));
        self.typing = true;
        Ok(ChatTicket {
            message: input.to_string(),
        })
    }

    /// Append the reply for a send started with [`begin_send`](Self::begin_send).
    pub fn finish_send(&mut self, _ticket: ChatTicket, reply: String) {
        self.messages.push(ChatMessage::ai(reply));
        self.typing = false;
    }

    /// One full send/receive cycle against `backend`. Returns the reply.
    pub fn send(
        &mut self,
        backend: &dyn AnalysisBackend,
        input: &str,
    ) -> Result<String, ChatError> {
        let ticket = self.begin_send(input)?;
        let reply = backend.send_chat_message(&ticket.message);
        self.finish_send(ticket, reply.clone());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_greeting() {
        let chat = ChatSession::new();
        assert_eq!(chat.messages(), &[ChatMessage::ai(GREETING)]);
        assert!(!chat.is_typing());
    }

    #[test]
    fn whitespace_input_is_not_sent() {
        let mut chat = ChatSession::new();
        assert_eq!(chat.begin_send("   \t"), Err(ChatError::EmptyMessage));
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn second_send_waits_for_reply() {
        let mut chat = ChatSession::new();
        let ticket = chat.begin_send("first").unwrap();
        assert!(chat.is_typing());
        assert_eq!(chat.begin_send("second"), Err(ChatError::ReplyPending));
        chat.finish_send(ticket, "answer".into());
        assert!(!chat.is_typing());
        assert_eq!(
            chat.messages()[1..],
            [ChatMessage::user("first"), ChatMessage::ai("answer")]
        );
    }

    #[test]
    fn message_is_sent_as_typed() {
        let mut chat = ChatSession::new();
        let ticket = chat.begin_send("  spaced  ").unwrap();
        assert_eq!(ticket.message, "  spaced  ");
    }

    #[test]
    fn sender_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::ai("hi")).unwrap();
        assert_eq!(json, r#"{"sender":"ai","text":"hi"}"#);
    }
}
