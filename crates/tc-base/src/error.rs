//! Error taxonomy: fatal startup configuration errors and recoverable
//! per-request chat errors.

use thiserror::Error;

/// Startup configuration failure. Fatal: no request is ever attempted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable absent or blank
    #[error("missing required setting {0} (set it in the environment or a .env file)")]
    Missing(&'static str),
    /// Variable present but unusable
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid { var: &'static str, value: String, reason: String },
}

/// Typed error for one chat request.
///
/// Every variant is recoverable: the session survives, the user turn stays
/// committed and no assistant turn is added.
#[derive(Debug, Error)]
pub enum ChatError {
    /// API returned a non-success HTTP status
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },
    /// A `data:` line did not hold a valid chunk
    #[error("Decode error: {message} (line: {line})")]
    Decode { message: String, line: String },
    /// Connection, read, or premature end-of-stream failure
    #[error("Transport error: {0}")]
    Transport(String),
    /// Server reported an error inside the stream
    #[error("Upstream error: {0}")]
    Upstream(String),
    /// Aborted by the user
    #[error("Request cancelled")]
    Cancelled,
}

impl ChatError {
    /// Text shown to the user in the notice area.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Status { status, body } => format!("{}:\n\n{}", status, body),
            other => format!("Response Error:\n\n{}", other),
        }
    }

    /// Status errors are warnings (the server answered); the rest are failures.
    pub fn is_warning(&self) -> bool {
        matches!(self, ChatError::Status { .. } | ChatError::Cancelled)
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        ChatError::Transport(e.to_string())
    }
}

impl From<std::io::Error> for ChatError {
    fn from(e: std::io::Error) -> Self {
        ChatError::Transport(e.to_string())
    }
}
