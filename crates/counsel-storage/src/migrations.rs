//! Database schema migrations.
//!
//! Applies the initial schema: the conversations index, the per-conversation
//! message log, and the schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use counsel_core::error::CounselError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental
/// changes.
pub fn run_migrations(conn: &Connection) -> Result<(), CounselError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| CounselError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| CounselError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
///
/// Timestamps are epoch milliseconds. `messages.seq` uses AUTOINCREMENT so
/// sequence ids are monotonically increasing by insertion order and never
/// reused after a clear.
fn apply_v1(conn: &Connection) -> Result<(), CounselError> {
    conn.execute_batch(
        "
        -- Conversation index. Lightweight records only; message bodies
        -- live in the messages table and are loaded per conversation.
        CREATE TABLE IF NOT EXISTS conversations (
            id                TEXT PRIMARY KEY NOT NULL,
            title             TEXT NOT NULL,
            created_at        INTEGER NOT NULL,
            last_activity_at  INTEGER NOT NULL,
            model_label       TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_conversations_created
            ON conversations (created_at DESC);

        -- Append-only message log, one row per message.
        CREATE TABLE IF NOT EXISTS messages (
            seq              INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id  TEXT NOT NULL,
            text             TEXT NOT NULL,
            origin           TEXT NOT NULL
                             CHECK (origin IN ('user', 'assistant')),
            kind             TEXT NOT NULL DEFAULT 'text'
                             CHECK (kind IN ('text', 'voice', 'quick_action')),
            created_at       INTEGER NOT NULL,
            FOREIGN KEY (conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_messages_conversation
            ON messages (conversation_id, seq ASC);

        -- Record migration.
        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| CounselError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
