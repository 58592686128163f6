//! Counsel core crate - shared types, errors, and configuration.
//!
//! Defines the conversation/message data model used by the storage and
//! chat crates, the top-level `CounselError` type, and the TOML-backed
//! application configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{BackendConfig, CounselConfig, GeneralConfig};
pub use error::{CounselError, Result};
pub use types::{now_millis, Conversation, Message, MessageDraft, MessageKind, MessageOrigin};
