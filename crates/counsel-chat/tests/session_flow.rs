//! End-to-end exercises of the chat core: controller + store + index over
//! a file-backed database, across process-style reloads.

use std::sync::Arc;

use async_trait::async_trait;

use counsel_chat::{ChatBackend, ChatRequest, ReplySource, ResponseClient, SessionController};
use counsel_core::error::CounselError;
use counsel_core::types::MessageKind;
use counsel_storage::{ConversationIndex, Database, MessageStore};

struct ScriptedBackend {
    replies_before_outage: std::sync::Mutex<u32>,
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn send_chat(&self, request: &ChatRequest) -> Result<String, CounselError> {
        let mut remaining = self.replies_before_outage.lock().unwrap();
        if *remaining == 0 {
            return Err(CounselError::Transport("connection refused".to_string()));
        }
        *remaining -= 1;
        Ok(format!("Considered answer to: {}", request.message))
    }

    async fn transcribe(&self, _audio: Vec<u8>, _mime: &str) -> Result<String, CounselError> {
        Ok("what are my fundamental rights".to_string())
    }
}

fn controller_at(path: &std::path::Path, replies_before_outage: u32) -> SessionController {
    let db = Arc::new(Database::new(path).unwrap());
    let store = MessageStore::new(Arc::clone(&db));
    let index = ConversationIndex::new(db, "JustlyAI");
    let client = ResponseClient::new(
        Arc::new(ScriptedBackend {
            replies_before_outage: std::sync::Mutex::new(replies_before_outage),
        }),
        "english",
    );
    SessionController::new(store, index, client)
}

#[tokio::test]
async fn conversation_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counsel.db");

    let conversation_id;
    {
        let controller = controller_at(&path, 10);
        let conversation = controller.new_conversation().unwrap();
        conversation_id = conversation.id;

        controller
            .send_user_message("Am I owed overtime pay?", MessageKind::Text)
            .await
            .unwrap();
        controller
            .send_user_message("And paid leave?", MessageKind::Text)
            .await
            .unwrap();
    }

    // Fresh controller over the same database, as after an app restart.
    let controller = controller_at(&path, 10);
    let listed = controller.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, conversation_id);
    assert_eq!(listed[0].title, "Chat 1");

    controller.open(conversation_id).unwrap();
    let messages = controller.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].text, "Am I owed overtime pay?");
    assert!(messages[1].text.contains("Am I owed overtime pay?"));
    assert_eq!(messages[2].text, "And paid leave?");

    // Strictly increasing sequence, no duplicates, no losses.
    for pair in messages.windows(2) {
        assert!(pair[1].seq > pair[0].seq);
    }
}

#[tokio::test]
async fn outage_mid_conversation_degrades_to_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counsel.db");

    // One remote reply, then the backend goes down.
    let controller = controller_at(&path, 1);
    controller.new_conversation().unwrap();

    let first = controller
        .send_user_message("hello there", MessageKind::Text)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.source, ReplySource::Remote);

    let second = controller
        .send_user_message("what about consumer rights?", MessageKind::Text)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.source, ReplySource::Fallback);
    assert!(second.assistant.text.contains("Right to redressal"));

    // Both exchanges persisted despite the outage.
    assert_eq!(controller.messages().len(), 4);
}

#[tokio::test]
async fn multiple_conversations_stay_independent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counsel.db");
    let controller = controller_at(&path, 100);

    let first = controller.new_conversation().unwrap();
    controller
        .send_user_message("first topic", MessageKind::Text)
        .await
        .unwrap();

    let second = controller.new_conversation().unwrap();
    controller
        .send_user_message("second topic", MessageKind::Text)
        .await
        .unwrap();

    assert_ne!(first.id, second.id);

    // Newest-first listing.
    let listed = controller.list().unwrap();
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
    assert_eq!(listed[0].title, "Chat 2");

    // Clearing one leaves the other intact.
    controller.open(first.id).unwrap();
    controller.clear_conversation().unwrap();
    assert!(controller.messages().is_empty());

    controller.open(second.id).unwrap();
    assert_eq!(controller.messages().len(), 2);
}

#[tokio::test]
async fn transcribed_voice_command_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counsel.db");

    // Backend is down for chat but STT still works; the voice question
    // gets the keyword fallback.
    let controller = controller_at(&path, 0);
    controller.new_conversation().unwrap();

    let transcript = controller
        .transcribe(vec![0u8; 32], "audio/webm")
        .await
        .unwrap();
    let exchange = controller
        .send_user_message(&transcript, MessageKind::Voice)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(exchange.user.kind, MessageKind::Voice);
    assert_eq!(exchange.source, ReplySource::Fallback);
    assert!(exchange.assistant.text.contains("Article 21A"));
}
