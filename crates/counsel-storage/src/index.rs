//! Conversation index: lightweight conversation records ordered by recency.
//!
//! The index persists titles and timestamps only; message bodies live in
//! the message store and are loaded per conversation. Ordering is
//! most-recently-created-first and is not re-sorted by later activity.

use std::sync::{Arc, Mutex};

use rusqlite::OptionalExtension;
use tracing::debug;
use uuid::Uuid;

use counsel_core::error::CounselError;
use counsel_core::types::{now_millis, Conversation};

use crate::db::Database;

/// SQLite-backed conversation index with an in-process "currently open"
/// marker.
#[derive(Clone)]
pub struct ConversationIndex {
    db: Arc<Database>,
    model_label: String,
    // Client-side selection state; deliberately not persisted.
    active: Arc<Mutex<Option<Uuid>>>,
}

impl ConversationIndex {
    pub fn new(db: Arc<Database>, model_label: impl Into<String>) -> Self {
        Self {
            db,
            model_label: model_label.into(),
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Allocate a new conversation at the head of the index.
    ///
    /// Assigns a fresh id, a `"Chat {n}"` default title, and now-timestamps;
    /// persists the record and returns it.
    pub fn create(&self) -> Result<Conversation, CounselError> {
        let now = now_millis();
        let conversation = self.db.with_conn(|conn| {
            let existing: i64 = conn
                .query_row("SELECT COUNT(*) FROM conversations", [], |row| row.get(0))
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            let conversation = Conversation {
                id: Uuid::new_v4(),
                title: format!("Chat {}", existing + 1),
                created_at: now,
                last_activity_at: now,
                model_label: self.model_label.clone(),
            };

            conn.execute(
                "INSERT INTO conversations (id, title, created_at, last_activity_at, model_label)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    conversation.id.to_string(),
                    conversation.title,
                    conversation.created_at,
                    conversation.last_activity_at,
                    conversation.model_label,
                ],
            )
            .map_err(|e| CounselError::Storage(format!("Failed to create conversation: {}", e)))?;

            Ok(conversation)
        })?;

        debug!(id = %conversation.id, title = %conversation.title, "Conversation created");
        Ok(conversation)
    }

    /// All conversations, most-recently-created-first.
    ///
    /// Creation order is the display order; `touch` does not reorder.
    pub fn list(&self) -> Result<Vec<Conversation>, CounselError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, title, created_at, last_activity_at, model_label
                     FROM conversations
                     ORDER BY created_at DESC, rowid DESC",
                )
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map([], row_to_conversation)
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            let mut conversations = Vec::new();
            for row in rows {
                conversations.push(row.map_err(|e| CounselError::Storage(e.to_string()))??);
            }
            Ok(conversations)
        })
    }

    /// Fetch a single conversation record.
    pub fn get(&self, id: Uuid) -> Result<Option<Conversation>, CounselError> {
        self.db.with_conn(|conn| {
            let result = conn
                .query_row(
                    "SELECT id, title, created_at, last_activity_at, model_label
                     FROM conversations WHERE id = ?1",
                    rusqlite::params![id.to_string()],
                    row_to_conversation,
                )
                .optional()
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            match result {
                Some(conv) => Ok(Some(conv?)),
                None => Ok(None),
            }
        })
    }

    /// Update `last_activity_at`. Does not reorder the list.
    pub fn touch(&self, id: Uuid, timestamp: i64) -> Result<(), CounselError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE conversations SET last_activity_at = ?2 WHERE id = ?1",
                rusqlite::params![id.to_string(), timestamp],
            )
            .map_err(|e| CounselError::Storage(format!("Failed to touch conversation: {}", e)))?;
            Ok(())
        })
    }

    /// Mark a conversation as currently open. In-process state only.
    pub fn select(&self, id: Uuid) {
        if let Ok(mut active) = self.active.lock() {
            *active = Some(id);
        }
    }

    /// The currently open conversation, if any.
    pub fn active(&self) -> Option<Uuid> {
        self.active.lock().ok().and_then(|a| *a)
    }
}

type SqlConversion = Result<Conversation, CounselError>;

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<SqlConversion> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let created_at: i64 = row.get(2)?;
    let last_activity_at: i64 = row.get(3)?;
    let model_label: String = row.get(4)?;

    Ok(Uuid::parse_str(&id)
        .map_err(|e| CounselError::Storage(format!("Invalid conversation id {}: {}", id, e)))
        .map(|id| Conversation {
            id,
            title,
            created_at,
            last_activity_at,
            model_label,
        }))
}

// =============================================================================
// Tests
// =============================================================================
