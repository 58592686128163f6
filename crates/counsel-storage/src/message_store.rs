//! Append-only message log, persisted per conversation.
//!
//! Every successful append or clear hits durable storage before returning,
//! so a reload immediately after a crash reconstructs the state observed
//! just before it.

use std::sync::Arc;

use rusqlite::OptionalExtension;
use uuid::Uuid;

use counsel_core::error::CounselError;
use counsel_core::types::{now_millis, Message, MessageDraft, MessageKind, MessageOrigin};

use crate::db::Database;

/// SQLite-backed message store.
#[derive(Clone)]
pub struct MessageStore {
    db: Arc<Database>,
}

impl MessageStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append a message to the end of the conversation's log.
    ///
    /// The store assigns the next sequence id and the creation timestamp,
    /// and returns the stored message. The write is durable before this
    /// returns `Ok`.
    pub fn append(
        &self,
        conversation_id: Uuid,
        draft: MessageDraft,
    ) -> Result<Message, CounselError> {
        let created_at = now_millis();
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (conversation_id, text, origin, kind, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    conversation_id.to_string(),
                    draft.text,
                    draft.origin.as_str(),
                    draft.kind.as_str(),
                    created_at,
                ],
            )
            .map_err(|e| CounselError::Storage(format!("Failed to append message: {}", e)))?;

            Ok(Message {
                seq: conn.last_insert_rowid(),
                conversation_id,
                text: draft.text,
                origin: draft.origin,
                kind: draft.kind,
                created_at,
            })
        })
    }

    /// Load the ordered message log for a conversation.
    ///
    /// Returns an empty vec if the conversation has no messages or does
    /// not exist; "not found" is never an error here.
    pub fn load(&self, conversation_id: Uuid) -> Result<Vec<Message>, CounselError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT seq, text, origin, kind, created_at
                     FROM messages
                     WHERE conversation_id = ?1
                     ORDER BY seq ASC",
                )
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![conversation_id.to_string()], |row| {
                    let origin: String = row.get(2)?;
                    let kind: String = row.get(3)?;
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        origin,
                        kind,
                        row.get::<_, i64>(4)?,
                    ))
                })
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            let mut messages = Vec::new();
            for row in rows {
                let (seq, text, origin, kind, created_at) =
                    row.map_err(|e| CounselError::Storage(e.to_string()))?;
                let origin = MessageOrigin::parse(&origin).ok_or_else(|| {
                    CounselError::Storage(format!("Unknown message origin: {}", origin))
                })?;
                let kind = MessageKind::parse(&kind).ok_or_else(|| {
                    CounselError::Storage(format!("Unknown message kind: {}", kind))
                })?;
                messages.push(Message {
                    seq,
                    conversation_id,
                    text,
                    origin,
                    kind,
                    created_at,
                });
            }
            Ok(messages)
        })
    }

    /// Remove all messages for a conversation. Idempotent.
    pub fn clear(&self, conversation_id: Uuid) -> Result<(), CounselError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM messages WHERE conversation_id = ?1",
                rusqlite::params![conversation_id.to_string()],
            )
            .map_err(|e| CounselError::Storage(format!("Failed to clear messages: {}", e)))?;
            Ok(())
        })
    }

    /// Count messages in a conversation.
    pub fn count(&self, conversation_id: Uuid) -> Result<u64, CounselError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
                    rusqlite::params![conversation_id.to_string()],
                    |row| row.get(0),
                )
                .map_err(|e| CounselError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }

    /// The highest sequence id assigned so far, if any message exists.
    ///
    /// Used by the session layer to assign local sequence ids to messages
    /// held in memory after a failed persistence write.
    pub fn last_seq(&self, conversation_id: Uuid) -> Result<Option<i64>, CounselError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT MAX(seq) FROM messages WHERE conversation_id = ?1",
                rusqlite::params![conversation_id.to_string()],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()
            .map(|opt| opt.flatten())
            .map_err(|e| CounselError::Storage(e.to_string()))
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ConversationIndex;

    fn store_with_conversation() -> (MessageStore, Uuid) {
        let db = Arc::new(Database::in_memory().unwrap());
        let index = ConversationIndex::new(Arc::clone(&db), "test-model");
        let conv = index.create().unwrap();
        (MessageStore::new(db), conv.id)
    }

    #[test]
    fn test_append_assigns_increasing_seq() {
        let (store, cid) = store_with_conversation();

        let m1 = store
            .append(cid, MessageDraft::user("first", MessageKind::Text))
            .unwrap();
        let m2 = store.append(cid, MessageDraft::assistant("second")).unwrap();

        assert!(m2.seq > m1.seq);
        assert!(m2.created_at >= m1.created_at);
        assert_eq!(m1.text, "first");
        assert_eq!(m1.origin, MessageOrigin::User);
        assert_eq!(m2.origin, MessageOrigin::Assistant);
    }

    #[test]
    fn test_load_round_trip_preserves_order() {
        let (store, cid) = store_with_conversation();

        let mut appended = Vec::new();
        for i in 0..10 {
            let draft = if i % 2 == 0 {
                MessageDraft::user(format!("question {}", i), MessageKind::Text)
            } else {
                MessageDraft::assistant(format!("answer {}", i))
            };
            appended.push(store.append(cid, draft).unwrap());
        }

        let loaded = store.load(cid).unwrap();
        assert_eq!(loaded, appended);
    }

    #[test]
    fn test_load_empty_for_zero_appends() {
        let (store, cid) = store_with_conversation();
        assert!(store.load(cid).unwrap().is_empty());
    }

    #[test]
    fn test_load_unknown_conversation_is_empty_not_error() {
        let (store, _) = store_with_conversation();
        let loaded = store.load(Uuid::new_v4()).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_clear_removes_all_messages() {
        let (store, cid) = store_with_conversation();
        store
            .append(cid, MessageDraft::user("hello", MessageKind::Text))
            .unwrap();
        store.append(cid, MessageDraft::assistant("hi")).unwrap();

        store.clear(cid).unwrap();
        assert!(store.load(cid).unwrap().is_empty());
        assert_eq!(store.count(cid).unwrap(), 0);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (store, cid) = store_with_conversation();
        store.clear(cid).unwrap();
        store.clear(cid).unwrap();
        assert!(store.load(cid).unwrap().is_empty());
    }

    #[test]
    fn test_seq_not_reused_after_clear() {
        let (store, cid) = store_with_conversation();
        let m1 = store
            .append(cid, MessageDraft::user("before", MessageKind::Text))
            .unwrap();
        store.clear(cid).unwrap();
        let m2 = store
            .append(cid, MessageDraft::user("after", MessageKind::Text))
            .unwrap();
        assert!(m2.seq > m1.seq);
    }

    #[test]
    fn test_logs_are_independent_per_conversation() {
        let db = Arc::new(Database::in_memory().unwrap());
        let index = ConversationIndex::new(Arc::clone(&db), "test-model");
        let store = MessageStore::new(Arc::clone(&db));
        let a = index.create().unwrap().id;
        let b = index.create().unwrap().id;

        store
            .append(a, MessageDraft::user("to a", MessageKind::Text))
            .unwrap();
        store
            .append(b, MessageDraft::user("to b", MessageKind::Voice))
            .unwrap();

        let in_a = store.load(a).unwrap();
        let in_b = store.load(b).unwrap();
        assert_eq!(in_a.len(), 1);
        assert_eq!(in_b.len(), 1);
        assert_eq!(in_a[0].text, "to a");
        assert_eq!(in_b[0].text, "to b");
        assert_eq!(in_b[0].kind, MessageKind::Voice);

        store.clear(a).unwrap();
        assert_eq!(store.count(b).unwrap(), 1);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");

        let cid;
        {
            let db = Arc::new(Database::new(&path).unwrap());
            let index = ConversationIndex::new(Arc::clone(&db), "test-model");
            let store = MessageStore::new(Arc::clone(&db));
            cid = index.create().unwrap().id;
            store
                .append(cid, MessageDraft::user("persisted?", MessageKind::Text))
                .unwrap();
            store
                .append(cid, MessageDraft::assistant("persisted."))
                .unwrap();
        }

        let db = Arc::new(Database::new(&path).unwrap());
        let store = MessageStore::new(db);
        let loaded = store.load(cid).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].text, "persisted?");
        assert_eq!(loaded[1].text, "persisted.");
    }

    #[test]
    fn test_last_seq() {
        let (store, cid) = store_with_conversation();
        assert_eq!(store.last_seq(cid).unwrap(), None);

        let m = store
            .append(cid, MessageDraft::user("hello", MessageKind::Text))
            .unwrap();
        assert_eq!(store.last_seq(cid).unwrap(), Some(m.seq));
    }

    #[test]
    fn test_append_to_unknown_conversation_is_storage_error() {
        let (store, _) = store_with_conversation();
        let result = store.append(Uuid::new_v4(), MessageDraft::user("hi", MessageKind::Text));
        assert!(matches!(result, Err(CounselError::Storage(_))));
    }
}
