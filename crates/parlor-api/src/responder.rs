//! Canned reply generation. The server is the only place replies come from.

const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";
const HELP_OFFER: &str = "I'm here to assist you with information, answering questions, or just having a conversation. What would you like to know?";
const ACKNOWLEDGMENT: &str = "You're welcome! It's been a pleasure assisting you. Feel free to ask if you need anything else.";
const QUESTION_DEFLECTION: &str = "That's an interesting question. While I'm just a simple mock AI right now, in a full implementation I would provide a thoughtful answer based on my knowledge and capabilities.";

/// Pick a reply by case-insensitive keyword, first match wins.
pub fn reply(message: &str) -> String {
    let lowered = message.to_lowercase();

    if lowered.contains("hello") || lowered.contains("hi") {
        GREETING.to_string()
    } else if lowered.contains("help") {
        HELP_OFFER.to_string()
    } else if lowered.contains("thank") {
        ACKNOWLEDGMENT.to_string()
    } else if lowered.contains('?') {
        QUESTION_DEFLECTION.to_string()
    } else {
        // Split on single spaces so runs of spaces yield empty words
        let opening = message.split(' ').take(3).collect::<Vec<_>>().join(" ");
        format!(
            "I understand you're saying something about {}... In a complete implementation, I would give a more substantive and contextual response to your message.",
            opening
        )
    }
}
