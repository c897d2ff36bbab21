use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::client::AssistantError;

pub const WELCOME: &str = "Hello! I'm your AI medicine assistant powered by Gemini. \
Ask me anything about medicines, drug interactions, side effects, or general health advice. \
Your conversations are saved locally.";

pub const RESET_NOTICE: &str = "Chat history cleared. How can I help you today?";

pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai", alias = "assistant")]
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Message {
    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Assistant)
    }
}

/// Ordered, append-only message list with unique ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn welcome() -> Self {
        Self(vec![Message::assistant(WELCOME)])
    }

    pub fn reset() -> Self {
        Self(vec![Message::assistant(RESET_NOTICE)])
    }

    /// Rejects lists that reuse a message id.
    pub fn from_messages(messages: Vec<Message>) -> Result<Self, AssistantError> {
        let mut seen = HashSet::with_capacity(messages.len());
        for m in &messages {
            if !seen.insert(m.id.as_str()) {
                return Err(AssistantError::InvalidTranscript(format!(
                    "duplicate message id {}",
                    m.id
                )));
            }
        }
        Ok(Self(messages))
    }

    pub fn push(&mut self, message: Message) {
        self.0.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn count(&self, sender: Sender) -> usize {
        self.0.iter().filter(|m| m.sender == sender).count()
    }
}

/// Downloadable chat export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub messages: Vec<Message>,
    #[serde(with = "time::serde::rfc3339")]
    pub export_date: OffsetDateTime,
    pub total_messages: usize,
    pub user_messages: usize,
    pub ai_messages: usize,
}

impl ExportDocument {
    pub fn new(transcript: &Transcript, export_date: OffsetDateTime) -> Self {
        Self {
            messages: transcript.messages().to_vec(),
            export_date,
            total_messages: transcript.len(),
            user_messages: transcript.count(Sender::User),
            ai_messages: transcript.count(Sender::Assistant),
        }
    }

    /// `ai-assistant-chat-YYYY-MM-DD.json`
    pub fn file_name(&self) -> String {
        let d = self.export_date.date();
        format!(
            "ai-assistant-chat-{:04}-{:02}-{:02}.json",
            d.year(),
            u8::from(d.month()),
            d.day()
        )
    }

    /// Counts in the document are informational; the message list is the
    /// source of truth.
    pub fn into_transcript(self) -> Result<Transcript, AssistantError> {
        Transcript::from_messages(self.messages)
    }
}
