use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use super::client::{AssistantError, TextGenerator};
use super::preferences::{Preferences, PreferencesPatch};
use super::transcript::{ExportDocument, Message, Sender, Transcript, APOLOGY};
use crate::storage::{keys, load_json, save_json, KvStore, StorageError};

/// Canned prompt for the connection check.
pub const CONNECTION_CHECK_PROMPT: &str = "Hello";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Idle,
    Testing,
    Connected,
    Error,
}

struct ConversationState {
    transcript: Transcript,
    preferences: Preferences,
    status: ConnectionStatus,
    /// Inline error from the last exchange or check.
    error: Option<String>,
    /// Storage banner from the last write.
    warning: Option<String>,
    /// Last mutation; doubles as the persisted last-save stamp.
    updated_at: OffsetDateTime,
}

/// One profile's chat.
pub struct Conversation {
    profile: Uuid,
    state: Mutex<ConversationState>,
    /// Held for a whole exchange: one request in flight, later sends queue.
    turn: Mutex<()>,
    typing: AtomicBool,
}

/// Raises the typing flag for its lifetime.
struct TypingGuard<'a>(&'a AtomicBool);

impl<'a> TypingGuard<'a> {
    fn engage(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for TypingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationView {
    pub messages: Vec<Message>,
    pub preferences: Preferences,
    pub typing: bool,
    pub status: ConnectionStatus,
    pub error: Option<String>,
    pub warning: Option<String>,
    pub credential_configured: bool,
    pub input_enabled: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub last_modified: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct SendOutcome {
    pub user_message: Message,
    pub reply: Message,
    /// Set when `reply` is the apology.
    pub error: Option<String>,
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveOutcome {
    pub saved: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub saved_at: OffsetDateTime,
    pub warning: Option<String>,
}

pub struct AssistantService {
    storage: Arc<dyn KvStore>,
    generator: Arc<dyn TextGenerator>,
    conversations: RwLock<HashMap<Uuid, Arc<Conversation>>>,
}

impl AssistantService {
    pub fn new(storage: Arc<dyn KvStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            storage,
            generator,
            conversations: RwLock::new(HashMap::new()),
        }
    }

    pub fn credential_configured(&self) -> bool {
        self.generator.is_configured()
    }

    /// The profile's conversation, restored from storage on first use and
    /// kept for the rest of the process.
    async fn open(&self, profile: Uuid) -> Arc<Conversation> {
        if let Some(c) = self.conversations.read().await.get(&profile) {
            return c.clone();
        }
        let (conversation, _) = self.restore(profile).await;
        self.track(profile, conversation).await
    }

    /// Like `open`, for reads: a profile with nothing stored gets a
    /// throwaway welcome conversation that is not kept.
    async fn peek(&self, profile: Uuid) -> Arc<Conversation> {
        if let Some(c) = self.conversations.read().await.get(&profile) {
            return c.clone();
        }
        match self.restore(profile).await {
            (conversation, true) => self.track(profile, conversation).await,
            (conversation, false) => conversation,
        }
    }

    async fn track(&self, profile: Uuid, conversation: Arc<Conversation>) -> Arc<Conversation> {
        self.conversations
            .write()
            .await
            .entry(profile)
            .or_insert(conversation)
            .clone()
    }

    /// Builds the conversation from storage; the flag tells whether anything
    /// was stored for the profile.
    async fn restore(&self, profile: Uuid) -> (Arc<Conversation>, bool) {
        let store = self.storage.as_ref();
        let messages: Option<Vec<Message>> =
            load_json(store, profile, keys::ASSISTANT_MESSAGES).await;
        let preferences: Option<Preferences> =
            load_json(store, profile, keys::ASSISTANT_PREFERENCES).await;
        let stored = messages.is_some() || preferences.is_some();

        let transcript = match messages.map(Transcript::from_messages) {
            Some(Ok(t)) => t,
            Some(Err(e)) => {
                warn!(error = %e, %profile, "discarding stored transcript");
                Transcript::welcome()
            }
            None => Transcript::welcome(),
        };

        let conversation = Arc::new(Conversation {
            profile,
            state: Mutex::new(ConversationState {
                transcript,
                preferences: preferences.unwrap_or_default(),
                status: ConnectionStatus::Idle,
                error: None,
                warning: None,
                updated_at: OffsetDateTime::now_utc(),
            }),
            turn: Mutex::new(()),
            typing: AtomicBool::new(false),
        });
        (conversation, stored)
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.conversations.read().await.len()
    }

    async fn persist(&self, profile: Uuid, st: &ConversationState) -> Result<(), StorageError> {
        let store = self.storage.as_ref();
        let stamp = st
            .updated_at
            .format(&Rfc3339)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        save_json(store, profile, keys::ASSISTANT_MESSAGES, &st.transcript).await?;
        save_json(store, profile, keys::ASSISTANT_PREFERENCES, &st.preferences).await?;
        save_json(store, profile, keys::ASSISTANT_LAST_SAVE, &stamp).await?;
        save_json(
            store,
            profile,
            keys::ASSISTANT_CONVERSATION_COUNT,
            &st.transcript.count(Sender::User),
        )
        .await?;
        Ok(())
    }

    /// Marks a mutation and auto-saves when enabled.
    async fn touch(&self, profile: Uuid, st: &mut ConversationState) {
        st.updated_at = OffsetDateTime::now_utc();
        if st.preferences.auto_save {
            self.record_save(profile, st).await;
        }
    }

    async fn record_save(&self, profile: Uuid, st: &mut ConversationState) {
        st.warning = match self.persist(profile, st).await {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, %profile, "chat not persisted");
                Some(e.warning())
            }
        };
    }

    fn view_of(&self, conv: &Conversation, st: &ConversationState) -> ConversationView {
        let configured = self.credential_configured();
        let typing = conv.typing.load(Ordering::SeqCst);
        ConversationView {
            messages: st.transcript.messages().to_vec(),
            preferences: st.preferences.clone(),
            typing,
            status: st.status,
            error: st.error.clone(),
            warning: st.warning.clone(),
            credential_configured: configured,
            input_enabled: configured && !typing,
            last_modified: st.updated_at,
        }
    }

    pub async fn view(&self, profile: Uuid) -> ConversationView {
        let conv = self.peek(profile).await;
        let st = conv.state.lock().await;
        self.view_of(&conv, &st)
    }

    /// One exchange: the user message is appended before the call, then
    /// the reply or exactly one apology.
    pub async fn send(&self, profile: Uuid, text: &str) -> Result<SendOutcome, AssistantError> {
        if text.trim().is_empty() {
            return Err(AssistantError::EmptyPrompt);
        }
        let conv = self.open(profile).await;
        if !self.generator.is_configured() {
            let err = AssistantError::CredentialMissing;
            conv.state.lock().await.error = Some(err.to_string());
            return Err(err);
        }

        let _turn = conv.turn.lock().await;

        let user_message = Message::user(text);
        {
            let mut st = conv.state.lock().await;
            st.transcript.push(user_message.clone());
            st.error = None;
            self.touch(conv.profile, &mut st).await;
        }

        let result = {
            let _typing = TypingGuard::engage(&conv.typing);
            self.generator.send_prompt(text).await
        };

        let mut st = conv.state.lock().await;
        let (reply, error) = match result {
            Ok(reply) => (Message::assistant(reply), None),
            Err(e) => {
                warn!(error = %e, %profile, "assistant reply failed");
                (Message::assistant(APOLOGY), Some(e.to_string()))
            }
        };
        st.transcript.push(reply.clone());
        st.error = error.clone();
        self.touch(conv.profile, &mut st).await;
        info!(%profile, failed = error.is_some(), "assistant exchange complete");

        Ok(SendOutcome {
            user_message,
            reply,
            error,
            warning: st.warning.clone(),
        })
    }

    pub async fn test_connection(&self, profile: Uuid) -> ConnectionStatus {
        let conv = self.open(profile).await;
        if !self.generator.is_configured() {
            let mut st = conv.state.lock().await;
            st.status = ConnectionStatus::Error;
            st.error = Some(AssistantError::CredentialMissing.to_string());
            return st.status;
        }

        conv.state.lock().await.status = ConnectionStatus::Testing;
        let result = self.generator.send_prompt(CONNECTION_CHECK_PROMPT).await;

        let mut st = conv.state.lock().await;
        match result {
            Ok(_) => {
                st.status = ConnectionStatus::Connected;
                st.error = None;
            }
            Err(e) => {
                warn!(error = %e, %profile, "connection test failed");
                st.status = ConnectionStatus::Error;
                st.error = Some(e.to_string());
            }
        }
        st.status
    }

    pub async fn update_preferences(
        &self,
        profile: Uuid,
        patch: PreferencesPatch,
    ) -> ConversationView {
        let conv = self.open(profile).await;
        let mut st = conv.state.lock().await;
        if st.preferences.apply(patch) {
            self.touch(profile, &mut st).await;
        }
        self.view_of(&conv, &st)
    }

    /// Writes the current state regardless of the auto-save preference.
    pub async fn save(&self, profile: Uuid) -> SaveOutcome {
        let conv = self.open(profile).await;
        let mut st = conv.state.lock().await;
        self.record_save(profile, &mut st).await;
        SaveOutcome {
            saved: st.warning.is_none(),
            saved_at: st.updated_at,
            warning: st.warning.clone(),
        }
    }

    /// Leaves a single reset notice and drops the persisted list. Waits for
    /// an exchange in flight so its reply cannot land after the reset.
    pub async fn clear(&self, profile: Uuid) -> ConversationView {
        let conv = self.open(profile).await;
        let _turn = conv.turn.lock().await;
        let mut st = conv.state.lock().await;
        st.transcript = Transcript::reset();
        st.error = None;
        st.updated_at = OffsetDateTime::now_utc();
        st.warning = match self.storage.remove(profile, keys::ASSISTANT_MESSAGES).await {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, %profile, "persisted chat not removed");
                Some(e.warning())
            }
        };
        info!(%profile, "chat history cleared");
        self.view_of(&conv, &st)
    }

    pub async fn export(&self, profile: Uuid) -> ExportDocument {
        let conv = self.peek(profile).await;
        let st = conv.state.lock().await;
        ExportDocument::new(&st.transcript, OffsetDateTime::now_utc())
    }

    pub async fn import(
        &self,
        profile: Uuid,
        document: ExportDocument,
    ) -> Result<ConversationView, AssistantError> {
        let transcript = document.into_transcript()?;
        let conv = self.open(profile).await;
        let _turn = conv.turn.lock().await;
        let mut st = conv.state.lock().await;
        st.transcript = transcript;
        st.error = None;
        self.touch(profile, &mut st).await;
        info!(%profile, messages = st.transcript.len(), "chat history imported");
        Ok(self.view_of(&conv, &st))
    }
}
