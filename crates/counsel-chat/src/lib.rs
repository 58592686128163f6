//! Conversational interface for Counsel.
//!
//! Provides the remote-with-local-fallback response client, the canned
//! keyword fallback responder, quick actions, and the session controller
//! that orchestrates message persistence around each exchange.

pub mod client;
pub mod controller;
pub mod error;
pub mod fallback;
pub mod quick_action;

pub use client::{
    ChatBackend, ChatRequest, ChatResponse, HttpBackend, Reply, ReplySource, ResponseClient,
};
pub use controller::{Exchange, SessionController, SessionState};
pub use error::ChatError;
pub use fallback::{local_reply, local_voice_reply};
pub use quick_action::QuickAction;
