//! Error types for the conversational interface.

use counsel_core::error::CounselError;

/// Errors from the chat layer.
///
/// Transport failures never appear here: the response client absorbs
/// them into the local fallback path.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("send already in progress for conversation {0}")]
    SendInProgress(uuid::Uuid),
    #[error("conversation not found: {0}")]
    ConversationNotFound(uuid::Uuid),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("transcription error: {0}")]
    Transcription(String),
}

impl From<CounselError> for ChatError {
    fn from(err: CounselError) -> Self {
        match err {
            CounselError::Transport(msg) => ChatError::Transport(msg),
            CounselError::Transcription(msg) => ChatError::Transcription(msg),
            CounselError::Storage(msg) => ChatError::Storage(msg),
            other => ChatError::Storage(other.to_string()),
        }
    }
}
