use thiserror::Error;

/// Message rendered into the transcript for any failed exchange.
pub const GENERIC_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Empty input")]
    EmptyInput,

    #[error("A request is already in flight")]
    Busy,

    #[error("{}", request_failed_message(.status, .status_text, .detail))]
    RequestFailed {
        status: Option<u16>,
        status_text: String,
        detail: String,
    },

    #[error("Invalid API response structure: {0}")]
    MalformedResponse(String),
}

impl ChatError {
    /// Errors the boundary drops without showing anything to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, ChatError::EmptyInput | ChatError::Busy)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}

fn request_failed_message(status: &Option<u16>, status_text: &str, detail: &str) -> String {
    match status {
        Some(code) => format!("API request failed: {} {}. {}", code, status_text, detail),
        None => format!("API request failed: {}", detail),
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::RequestFailed {
            status: err.status().map(|s| s.as_u16()),
            status_text: String::new(),
            detail: err.to_string(),
        }
    }
}
