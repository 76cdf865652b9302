//! Outbound chat-completions payload.

use serde::Serialize;

use crate::config::SamplingConfig;
use crate::session::{SessionState, Turn};

/// One message in the outbound `messages` array, borrowed from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutboundMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> OutboundMessage<'a> {
    pub fn system(content: &'a str) -> Self {
        Self { role: "system", content }
    }

    pub fn from_turn(turn: &'a Turn) -> Self {
        Self { role: turn.role.as_str(), content: &turn.content }
    }
}

/// Streaming request body. Always sent with `stream: true`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<OutboundMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub stream: bool,
}

impl<'a> ChatRequest<'a> {
    pub fn new(model: &'a str, session: &'a SessionState, config: &'a SamplingConfig) -> Self {
        Self {
            model,
            messages: session.build_outbound_messages(config),
            max_tokens: config.max_tokens(),
            temperature: config.temperature(),
            top_p: config.top_p(),
            top_k: config.top_k(),
            stream: true,
        }
    }
}
