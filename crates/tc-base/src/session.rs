//! In-memory conversation: the transcript plus one reasoning trace per
//! committed assistant turn.

use serde::{Deserialize, Serialize};

use crate::config::SamplingConfig;
use crate::request::OutboundMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// One transcript entry ready for display, with the reasoning trace of the
/// assistant turn attached by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry<'a> {
    pub turn: &'a Turn,
    pub reasoning: Option<&'a str>,
}

/// Transcript and reasoning traces. Turns are never edited once appended;
/// the only ways to change the state are append, commit and reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    transcript: Vec<Turn>,
    reasoning_traces: Vec<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn reasoning_traces(&self) -> &[String] {
        &self.reasoning_traces
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    pub fn assistant_turns(&self) -> usize {
        self.transcript.iter().filter(|t| t.role == Role::Assistant).count()
    }

    /// Record the user's message before anything is sent, so it stays
    /// visible whatever happens to the request.
    pub fn append_user_turn(&mut self, text: impl Into<String>) {
        self.transcript.push(Turn::user(text));
    }

    /// Record a completed response. Only called after the stream reached
    /// its termination sentinel.
    pub fn commit_assistant_turn(&mut self, answer: impl Into<String>, reasoning: impl Into<String>) {
        self.transcript.push(Turn::assistant(answer));
        self.reasoning_traces.push(reasoning.into());
        debug_assert!(self.reasoning_traces.len() <= self.assistant_turns());
    }

    pub fn reset(&mut self) {
        self.transcript.clear();
        self.reasoning_traces.clear();
    }

    /// Messages to send upstream: an optional system message from the
    /// configured instruction, then the whole transcript.
    ///
    /// Nothing is truncated; every turn is resent on every request.
    pub fn build_outbound_messages<'a>(&'a self, config: &'a SamplingConfig) -> Vec<OutboundMessage<'a>> {
        let mut out = Vec::with_capacity(self.transcript.len() + 1);
        if let Some(instruction) = config.instruction() {
            out.push(OutboundMessage::system(instruction));
        }
        out.extend(self.transcript.iter().map(OutboundMessage::from_turn));
        out
    }

    /// The transcript with the i-th reasoning trace attached to the i-th
    /// assistant turn. Empty traces are left off.
    pub fn history(&self) -> Vec<HistoryEntry<'_>> {
        let mut assistant_index = 0;
        self.transcript
            .iter()
            .map(|turn| {
                let reasoning = match turn.role {
                    Role::User => None,
                    Role::Assistant => {
                        let trace = self.reasoning_traces.get(assistant_index).map(String::as_str);
                        assistant_index += 1;
                        trace.filter(|t| !t.trim().is_empty())
                    }
                };
                HistoryEntry { turn, reasoning }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_commit_round_trip() {
        let mut session = SessionState::new();
        session.append_user_turn("hi");
        session.commit_assistant_turn("hello", "thought");

        assert_eq!(session.transcript(), &[Turn::user("hi"), Turn::assistant("hello")]);
        assert_eq!(session.reasoning_traces(), &["thought".to_string()]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut session = SessionState::new();
        session.append_user_turn("hi");
        session.commit_assistant_turn("hello", "thought");
        session.reset();

        assert!(session.is_empty());
        assert!(session.reasoning_traces().is_empty());
    }

    #[test]
    fn outbound_messages_prepend_system_only_when_instruction_set() {
        let mut session = SessionState::new();
        session.append_user_turn("q1");
        session.commit_assistant_turn("a1", "");
        session.append_user_turn("q2");

        let plain = SamplingConfig::default();
        let messages = session.build_outbound_messages(&plain);
        let roles: Vec<&str> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["user", "assistant", "user"]);

        let blank = SamplingConfig::default().with_instruction("");
        assert_eq!(session.build_outbound_messages(&blank).len(), 3);

        let instructed = SamplingConfig::default().with_instruction("Be brief.");
        let messages = session.build_outbound_messages(&instructed);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "Be brief.");
        assert_eq!(messages[3].content, "q2");
    }

    #[test]
    fn history_pairs_traces_with_assistant_turns_by_position() {
        let mut session = SessionState::new();
        session.append_user_turn("q1");
        session.commit_assistant_turn("a1", "r1");
        session.append_user_turn("q2");
        session.commit_assistant_turn("a2", "");
        session.append_user_turn("q3");
        session.commit_assistant_turn("a3", "r3");
        session.append_user_turn("q4");

        let reasoning: Vec<Option<&str>> = session.history().iter().map(|e| e.reasoning).collect();
        assert_eq!(reasoning, vec![None, Some("r1"), None, None, None, Some("r3"), None]);
    }

    #[test]
    fn traces_never_outnumber_assistant_turns() {
        let mut session = SessionState::new();
        for i in 0..5 {
            session.append_user_turn(format!("q{}", i));
            session.commit_assistant_turn(format!("a{}", i), "");
            assert!(session.reasoning_traces().len() <= session.assistant_turns());
        }
    }
}
