//! Counsel storage crate - SQLite persistence for conversations and messages.
//!
//! Provides a WAL-mode SQLite database with migrations, the append-only
//! per-conversation `MessageStore`, and the recency-ordered
//! `ConversationIndex`.

pub mod db;
pub mod index;
pub mod message_store;
pub mod migrations;

pub use db::Database;
pub use index::ConversationIndex;
pub use message_store::MessageStore;
