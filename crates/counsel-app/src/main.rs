//! Counsel application binary - composition root.
//!
//! Ties the crates together into a terminal chat client:
//! 1. Parse CLI args and load configuration from TOML
//! 2. Open storage (SQLite message log + conversation index)
//! 3. Build the response client over the HTTP backend
//! 4. Run the interactive chat loop

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use counsel_chat::{ChatError, QuickAction, ReplySource, ResponseClient, SessionController};
use counsel_core::config::CounselConfig;
use counsel_core::types::MessageKind;
use counsel_storage::{ConversationIndex, Database, MessageStore};

mod cli;

use cli::{expand_home, CliArgs};

#[tokio::main]
async fn main() -> Result<(), ChatError> {
    let args = CliArgs::parse();

    let config_path = args.resolve_config_path();
    let mut config = CounselConfig::load_or_default(&config_path);
    config.backend.base_url = args.resolve_base_url(&config.backend.base_url);
    config.general.data_dir = args.resolve_data_dir(&config.general.data_dir);
    config.general.log_level = args.resolve_log_level(&config.general.log_level);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.general.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let db_path = expand_home(&config.general.data_dir).join("counsel.db");
    let db = Arc::new(Database::new(&db_path)?);
    let store = MessageStore::new(Arc::clone(&db));
    let index = ConversationIndex::new(db, config.backend.model_label.clone());
    let client = ResponseClient::http(&config.backend)?;
    let controller = SessionController::new(store, index, client);

    tracing::info!(
        backend = %config.backend.base_url,
        db = %db_path.display(),
        "Counsel started"
    );

    println!("Counsel legal assistant. Type a question, or /help for commands.");
    run_repl(&controller).await
}

/// Interactive loop: plain lines are chat messages, slash commands map to
/// session operations.
async fn run_repl(controller: &SessionController) -> Result<(), ChatError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| ChatError::Storage(format!("failed to read input: {}", e)))?
        else {
            return Ok(());
        };
        let line = line.trim().to_string();

        match line.as_str() {
            "" => continue,
            "/quit" | "/exit" => return Ok(()),
            "/help" => print_help(),
            "/new" => {
                let conversation = controller.new_conversation()?;
                println!("Started {}.", conversation.title);
            }
            "/list" => {
                let conversations = controller.list()?;
                if conversations.is_empty() {
                    println!("No conversations yet. Send a message or /new to start one.");
                }
                for (i, conversation) in conversations.iter().enumerate() {
                    println!("{:>3}. {} [{}]", i + 1, conversation.title, conversation.model_label);
                }
            }
            "/clear" => {
                controller.clear_conversation()?;
                println!("Conversation cleared.");
            }
            "/emergency" => send_quick(controller, QuickAction::Emergency).await?,
            "/settlement" => send_quick(controller, QuickAction::Settlement).await?,
            "/court" => send_quick(controller, QuickAction::CourtPrep).await?,
            _ if line.starts_with("/open ") => {
                open_by_position(controller, line.trim_start_matches("/open ").trim())?;
            }
            _ if line.starts_with("/voice ") => {
                let spoken = line.trim_start_matches("/voice ").to_string();
                send_and_print(controller, &spoken, MessageKind::Voice).await?;
            }
            _ if line.starts_with('/') => {
                println!("Unknown command {}. Try /help.", line);
            }
            _ => send_and_print(controller, &line, MessageKind::Text).await?,
        }
    }
}

async fn send_and_print(
    controller: &SessionController,
    text: &str,
    kind: MessageKind,
) -> Result<(), ChatError> {
    match controller.send_user_message(text, kind).await {
        Ok(Some(exchange)) => {
            println!("{}", exchange.assistant.text);
            if exchange.source == ReplySource::Fallback {
                println!("(offline reply - assistant service unreachable)");
            }
            if let Some(notice) = exchange.notice {
                println!("Warning: {}", notice);
            }
            Ok(())
        }
        // Blank input: nothing to do.
        Ok(None) => Ok(()),
        Err(ChatError::SendInProgress(_)) => {
            println!("Still waiting on the previous reply.");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn send_quick(controller: &SessionController, action: QuickAction) -> Result<(), ChatError> {
    println!("> {}", action.prompt());
    match controller.send_quick_action(action).await {
        Ok(Some(exchange)) => {
            println!("{}", exchange.assistant.text);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(ChatError::SendInProgress(_)) => {
            println!("Still waiting on the previous reply.");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn open_by_position(controller: &SessionController, position: &str) -> Result<(), ChatError> {
    let Ok(n) = position.parse::<usize>() else {
        println!("Usage: /open <number> (see /list)");
        return Ok(());
    };
    let conversations = controller.list()?;
    let Some(conversation) = n.checked_sub(1).and_then(|i| conversations.get(i)) else {
        println!("No conversation {} (see /list).", position);
        return Ok(());
    };
    controller.open(conversation.id)?;
    println!("Opened {}.", conversation.title);
    for message in controller.messages() {
        println!("[{}] {}", message.origin.as_str(), message.text);
    }
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  /new          start a new conversation");
    println!("  /list         list conversations, newest first");
    println!("  /open <n>     open conversation n from /list");
    println!("  /clear        clear the open conversation's messages");
    println!("  /voice <text> send text as a voice command");
    println!("  /emergency    quick action: Emergency Help");
    println!("  /settlement   quick action: Settlement Tips");
    println!("  /court        quick action: Court Prep");
    println!("  /quit         exit");
    println!("Anything else is sent to the assistant.");
}
