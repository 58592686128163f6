use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current wall-clock time as milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

// =============================================================================
// Enums
// =============================================================================

/// Who produced a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrigin {
    /// Typed, spoken, or quick-action input from the end user.
    User,
    /// Reply from the remote assistant or the local fallback.
    Assistant,
}

impl MessageOrigin {
    /// Stable string form used in the database schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageOrigin::User => "user",
            MessageOrigin::Assistant => "assistant",
        }
    }

    /// Parse the database string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(MessageOrigin::User),
            "assistant" => Some(MessageOrigin::Assistant),
            _ => None,
        }
    }
}

/// How the user input was produced. Provenance only; no behavioral effect
/// beyond selecting the voice-command fallback path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Typed text (default).
    #[default]
    Text,
    /// Transcribed voice input.
    Voice,
    /// One of the fixed quick-action prompts.
    QuickAction,
}

impl MessageKind {
    /// Stable string form used in the database schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Voice => "voice",
            MessageKind::QuickAction => "quick_action",
        }
    }

    /// Parse the database string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(MessageKind::Text),
            "voice" => Some(MessageKind::Voice),
            "quick_action" => Some(MessageKind::QuickAction),
            _ => None,
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// One entry in a conversation's append-only message log.
///
/// `seq` is assigned by the store at append time and is monotonically
/// increasing by insertion order; messages are never edited or removed
/// individually, only cleared with the whole conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Store-assigned sequence id, unique within a conversation.
    pub seq: i64,
    pub conversation_id: Uuid,
    /// Non-empty UTF-8 content. Blank input is rejected by callers and
    /// never reaches the store.
    pub text: String,
    pub origin: MessageOrigin,
    pub kind: MessageKind,
    /// Epoch milliseconds, set at append time, never mutated.
    pub created_at: i64,
}

/// A message as submitted for appending, before the store assigns
/// `seq` and `created_at`.
#[derive(Clone, Debug)]
pub struct MessageDraft {
    pub text: String,
    pub origin: MessageOrigin,
    pub kind: MessageKind,
}

impl MessageDraft {
    pub fn user(text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            text: text.into(),
            origin: MessageOrigin::User,
            kind,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: MessageOrigin::Assistant,
            kind: MessageKind::Text,
        }
    }
}

/// Lightweight conversation record held by the index. Message bodies are
/// loaded lazily per conversation, never all at once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    /// Display label, defaulted to a sequence number at creation.
    pub title: String,
    /// Epoch milliseconds at creation.
    pub created_at: i64,
    /// Epoch milliseconds of the most recent message or creation.
    pub last_activity_at: i64,
    /// Free-form tag naming the backend that produced replies.
    pub model_label: String,
}

// =============================================================================
// Tests
// =============================================================================
