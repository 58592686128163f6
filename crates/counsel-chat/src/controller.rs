//! Session controller: orchestrates the message store, conversation index,
//! and response client around each user exchange.
//!
//! Holds the live session: the currently open conversation, its in-memory
//! message view, and the Idle/Sending state the presentation layer renders.

use std::sync::{Mutex, MutexGuard};

use tracing::{info, warn};
use uuid::Uuid;

use counsel_core::types::{
    now_millis, Conversation, Message, MessageDraft, MessageKind, MessageOrigin,
};
use counsel_storage::{ConversationIndex, MessageStore};

use crate::client::{ReplySource, ResponseClient};
use crate::error::ChatError;
use crate::quick_action::QuickAction;

/// Send state of the live session. There is no terminal error state: the
/// worst case is a fallback reply plus an advisory notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sending,
}

/// The live, in-memory view of the conversation currently open.
#[derive(Debug)]
struct Session {
    conversation: Option<Conversation>,
    messages: Vec<Message>,
    state: SessionState,
}

/// Result of one completed user exchange.
#[derive(Clone, Debug)]
pub struct Exchange {
    pub user: Message,
    pub assistant: Message,
    /// Whether the reply came from the remote service or the local
    /// fallback. Informational only; behavior never branches on it.
    pub source: ReplySource,
    /// Advisory storage notice for the UI layer. When set, one of the two
    /// messages lives only in memory for the rest of the session.
    pub notice: Option<String>,
}

/// Orchestrator owning one live session at a time.
///
/// Processes one send at a time: a second `send_user_message` issued while
/// one is in flight is rejected, matching a UI that disables input while
/// Sending.
pub struct SessionController {
    store: MessageStore,
    index: ConversationIndex,
    client: ResponseClient,
    session: Mutex<Session>,
}

impl SessionController {
    pub fn new(store: MessageStore, index: ConversationIndex, client: ResponseClient) -> Self {
        Self {
            store,
            index,
            client,
            session: Mutex::new(Session {
                conversation: None,
                messages: Vec::new(),
                state: SessionState::Idle,
            }),
        }
    }

    /// Send one user message and append the assistant's reply.
    ///
    /// Blank or whitespace-only text is a silent no-op returning
    /// `Ok(None)`; nothing is stored or logged as an error. Otherwise the
    /// user message and a reply (remote or fallback, the user is never
    /// left without one) are appended and the index activity updated.
    ///
    /// If no conversation is open, one is created first.
    pub async fn send_user_message(
        &self,
        text: &str,
        kind: MessageKind,
    ) -> Result<Option<Exchange>, ChatError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let conversation_id = {
            let session = self.lock_session()?;
            session.conversation.as_ref().map(|c| c.id)
        };
        let conversation_id = match conversation_id {
            Some(id) => id,
            None => self.new_conversation()?.id,
        };

        {
            let mut session = self.lock_session()?;
            if session.state == SessionState::Sending {
                return Err(ChatError::SendInProgress(conversation_id));
            }
            session.state = SessionState::Sending;
        }

        let result = self.run_exchange(conversation_id, trimmed, kind).await;

        // Back to Idle on every path, success or not.
        if let Ok(mut session) = self.session.lock() {
            session.state = SessionState::Idle;
        }

        result.map(Some)
    }

    /// Trigger one of the fixed quick-action prompts.
    pub async fn send_quick_action(
        &self,
        action: QuickAction,
    ) -> Result<Option<Exchange>, ChatError> {
        self.send_user_message(action.prompt(), MessageKind::QuickAction)
            .await
    }

    /// Transcribe recorded audio via the backend's STT endpoint.
    pub async fn transcribe(&self, audio: Vec<u8>, mime: &str) -> Result<String, ChatError> {
        Ok(self.client.transcribe(audio, mime).await?)
    }

    /// Create a conversation, select it, and reset the message view.
    pub fn new_conversation(&self) -> Result<Conversation, ChatError> {
        let conversation = self.index.create()?;
        self.index.select(conversation.id);
        info!(id = %conversation.id, title = %conversation.title, "Opened new conversation");

        let mut session = self.lock_session()?;
        session.conversation = Some(conversation.clone());
        session.messages.clear();
        Ok(conversation)
    }

    /// Open an existing conversation and load its message log into the view.
    pub fn open(&self, id: Uuid) -> Result<(), ChatError> {
        let conversation = self
            .index
            .get(id)?
            .ok_or(ChatError::ConversationNotFound(id))?;
        let messages = self.store.load(id)?;
        self.index.select(id);

        let mut session = self.lock_session()?;
        session.conversation = Some(conversation);
        session.messages = messages;
        Ok(())
    }

    /// Clear the open conversation's message log.
    ///
    /// The conversation keeps its place and title in the index; only the
    /// messages go. No-op when nothing is open.
    pub fn clear_conversation(&self) -> Result<(), ChatError> {
        let mut session = self.lock_session()?;
        let Some(id) = session.conversation.as_ref().map(|c| c.id) else {
            return Ok(());
        };
        self.store.clear(id)?;
        session.messages.clear();
        info!(id = %id, "Conversation cleared");
        Ok(())
    }

    /// All conversations, most recently created first.
    pub fn list(&self) -> Result<Vec<Conversation>, ChatError> {
        Ok(self.index.list()?)
    }

    /// Snapshot of the open conversation's message view.
    pub fn messages(&self) -> Vec<Message> {
        self.session
            .lock()
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }

    /// The conversation currently open, if any.
    pub fn active_conversation(&self) -> Option<Conversation> {
        self.session
            .lock()
            .ok()
            .and_then(|s| s.conversation.clone())
    }

    /// Current send state.
    pub fn state(&self) -> SessionState {
        self.session
            .lock()
            .map(|s| s.state)
            .unwrap_or(SessionState::Idle)
    }

    // -- Private helpers --

    async fn run_exchange(
        &self,
        conversation_id: Uuid,
        text: &str,
        kind: MessageKind,
    ) -> Result<Exchange, ChatError> {
        let mut notice = None;

        let user = match self
            .store
            .append(conversation_id, MessageDraft::user(text, kind))
        {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Failed to persist user message; keeping in-memory copy");
                notice = Some(format!("Message could not be saved: {}", e));
                self.unsaved_message(conversation_id, text.to_string(), MessageOrigin::User, kind)?
            }
        };

        let reply = self.client.ask(text, kind == MessageKind::Voice).await;

        let draft = MessageDraft::assistant(reply.text.clone());
        let assistant = match self.store.append(conversation_id, draft.clone()) {
            Ok(message) => message,
            Err(first) => {
                // One best-effort retry; the reply stays visible in memory
                // either way.
                warn!(error = %first, "Failed to persist assistant reply; retrying");
                match self.store.append(conversation_id, draft) {
                    Ok(message) => message,
                    Err(second) => {
                        notice = Some(format!("Reply could not be saved: {}", second));
                        Message {
                            seq: user.seq + 1,
                            conversation_id,
                            text: reply.text.clone(),
                            origin: MessageOrigin::Assistant,
                            kind: MessageKind::Text,
                            created_at: now_millis(),
                        }
                    }
                }
            }
        };

        if let Err(e) = self.index.touch(conversation_id, assistant.created_at) {
            warn!(error = %e, "Failed to update conversation activity");
        }

        // Update the live view only if this conversation is still open;
        // a send outlives navigation and its result appears on next load.
        {
            let mut session = self.lock_session()?;
            if session.conversation.as_ref().map(|c| c.id) == Some(conversation_id) {
                session.messages.push(user.clone());
                session.messages.push(assistant.clone());
                if let Some(conversation) = session.conversation.as_mut() {
                    conversation.last_activity_at = assistant.created_at;
                }
            }
        }

        Ok(Exchange {
            user,
            assistant,
            source: reply.source,
            notice,
        })
    }

    /// Build a message that failed to persist, with the next local sequence
    /// id so ordering in the live session stays consistent.
    ///
    /// Prefers the highest persisted seq when the log is still readable,
    /// so local ids line up even when the view has not been loaded; falls
    /// back to the in-memory view when the store is down entirely.
    fn unsaved_message(
        &self,
        conversation_id: Uuid,
        text: String,
        origin: MessageOrigin,
        kind: MessageKind,
    ) -> Result<Message, ChatError> {
        let persisted = self.store.last_seq(conversation_id).ok().flatten();
        let session = self.lock_session()?;
        let in_view = session.messages.last().map(|m| m.seq);
        let seq = persisted.max(in_view).unwrap_or(0) + 1;
        Ok(Message {
            seq,
            conversation_id,
            text,
            origin,
            kind,
            created_at: now_millis(),
        })
    }

    fn lock_session(&self) -> Result<MutexGuard<'_, Session>, ChatError> {
        self.session
            .lock()
            .map_err(|e| ChatError::Storage(format!("session lock poisoned: {}", e)))
    }
}

// =============================================================================
// Tests
// =============================================================================
