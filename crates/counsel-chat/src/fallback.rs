//! Canned local responder, used when the remote assistant is unreachable.
//!
//! Pure functions, no I/O: every call with the same input returns the
//! same string, so the transport-failure path stays trivially testable.

/// Keyword-matched reply for general chat input.
///
/// Scans the text case-insensitively for the fixed legal topics; unmatched
/// input gets the capability-listing message.
pub fn local_reply(text: &str) -> String {
    let lowered = text.to_lowercase();

    if lowered.contains("fundamental rights") {
        concat!(
            "Here's information about fundamental rights:\n\n",
            "1. Right to Equality (Article 14-18)\n",
            "2. Right to Freedom (Article 19-22)\n",
            "3. Right against Exploitation (Article 23-24)\n",
            "4. Right to Freedom of Religion (Article 25-28)\n",
            "5. Right to Education (Article 21A)"
        )
        .to_string()
    } else if lowered.contains("labor laws") {
        concat!(
            "Labor Laws in India:\n\n",
            "\u{2022} Minimum wage varies by state\n",
            "\u{2022} 8-hour workday maximum\n",
            "\u{2022} Overtime pay for extra hours\n",
            "\u{2022} Paid leave and holidays\n",
            "\u{2022} Safe working conditions"
        )
        .to_string()
    } else if lowered.contains("consumer rights") {
        concat!(
            "Consumer Rights:\n\n",
            "\u{2022} Right to safety\n",
            "\u{2022} Right to information\n",
            "\u{2022} Right to choose\n",
            "\u{2022} Right to be heard\n",
            "\u{2022} Right to redressal"
        )
        .to_string()
    } else if lowered.contains("emergency") {
        concat!(
            "Emergency Contacts:\n\n",
            "\u{2022} Police: 100\n",
            "\u{2022} Women Helpline: 1091\n",
            "\u{2022} Child Helpline: 1098\n",
            "\u{2022} Legal Aid: 1800-11-0001"
        )
        .to_string()
    } else {
        concat!(
            "I'm your free legal assistant. I can help you with:\n",
            "\u{2022} Fundamental rights\n",
            "\u{2022} Labor laws\n",
            "\u{2022} Consumer rights\n",
            "\u{2022} Emergency contacts\n",
            "Please ask me a specific legal question."
        )
        .to_string()
    }
}

/// Keyword-matched reply for transcribed voice commands.
///
/// Recognizes the voice control words first; anything else is treated as
/// a spoken legal question and falls through to [`local_reply`].
pub fn local_voice_reply(command: &str) -> String {
    let lowered = command.to_lowercase();

    if lowered.contains("repeat") {
        "I can repeat my last response. What would you like me to repeat?".to_string()
    } else if lowered.contains("summarize") {
        "I can help you with legal information. What would you like to know?".to_string()
    } else if lowered.contains("clear") {
        "Chat history cleared. Starting fresh conversation.".to_string()
    } else if lowered.contains("help") {
        concat!(
            "Voice Commands:\n",
            "\u{2022} Ask legal questions\n",
            "\u{2022} Say 'repeat' to repeat\n",
            "\u{2022} Say 'summarize' for summary\n",
            "\u{2022} Say 'clear' to clear chat"
        )
        .to_string()
    } else {
        local_reply(command)
    }
}

// =============================================================================
// Tests
// =============================================================================
