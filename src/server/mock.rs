use serde_json::Value;

/// Content of the most recent user message, or empty when there is none.
pub fn last_user_message(messages: &Value) -> String {
    messages
        .as_array()
        .and_then(|list| {
            list.iter()
                .rev()
                .find(|m| m.get("role").and_then(Value::as_str) == Some("user"))
        })
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn mentions(message: &str, words: &[&str]) -> bool {
    words.iter().any(|w| message.contains(w))
}

/// Keyword-matched canned reply used when no upstream model is available.
pub fn generate_mock_response(user_message: &str) -> String {
    let lower = user_message.to_lowercase();

    if mentions(&lower, &["hello", "hi", "hey"]) {
        "Hello! I'm DeepSeek, an AI assistant. How can I help you today?".to_string()
    } else if mentions(&lower, &["2+2", "2 + 2", "two plus two"]) {
        "2 + 2 equals 4. This is a basic arithmetic operation.".to_string()
    } else if mentions(&lower, &["what are you", "who are you", "what is this"]) {
        "I'm DeepSeek, an AI language model created by DeepSeek AI. I'm running through OpenRouter to provide you with helpful responses to your questions.".to_string()
    } else if mentions(&lower, &["python", "programming", "code"]) {
        "I can help with Python programming and coding questions! Feel free to ask me about syntax, algorithms, debugging, or any programming concepts you'd like to learn about.".to_string()
    } else if mentions(&lower, &["weather", "temperature"]) {
        "I don't have access to real-time weather data, but I can help you understand weather concepts or suggest ways to get current weather information.".to_string()
    } else if mentions(&lower, &["thank", "thanks"]) {
        "You're welcome! I'm happy to help. Feel free to ask me anything else you'd like to know.".to_string()
    } else {
        format!(
            "I understand you're asking about: '{}'. This is a demo reply. With an upstream API key configured, the proxy forwards your conversation to the real model instead.",
            user_message
        )
    }
}
