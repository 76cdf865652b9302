//! Splits the delta stream into the reasoning and answer channels.

use crate::sse::StreamEvent;

/// Which of the two output channels an update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Reasoning,
    Answer,
}

/// Per-request lifecycle as seen by the render side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestPhase {
    #[default]
    Idle,
    Sending,
    Streaming,
    Committed,
    Failed,
}

impl RequestPhase {
    pub fn label(&self) -> &'static str {
        match self {
            RequestPhase::Idle => "READY",
            RequestPhase::Sending => "SENDING",
            RequestPhase::Streaming => "STREAMING",
            RequestPhase::Committed => "DONE",
            RequestPhase::Failed => "FAILED",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RequestPhase::Sending | RequestPhase::Streaming)
    }
}

/// Receiver of live rendering updates.
///
/// `update` always gets the channel's full accumulated text, never the
/// delta, so a display can simply replace what it shows.
pub trait RenderSink {
    fn update(&mut self, channel: Channel, full_text: &str);

    /// A request moved to a new phase.
    fn phase(&mut self, _phase: RequestPhase) {}

    /// The session changed; redraw the history.
    fn redraw(&mut self) {}
}

impl<F: FnMut(Channel, &str)> RenderSink for F {
    fn update(&mut self, channel: Channel, full_text: &str) {
        self(channel, full_text)
    }
}

/// Final text of both channels once the stream ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelOutput {
    pub reasoning: String,
    pub answer: String,
}

/// Two append-only buffers fed one event at a time.
#[derive(Debug, Default)]
pub struct ChannelAccumulator {
    reasoning: String,
    answer: String,
}

impl ChannelAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event, notifying the sink for each channel it touched
    /// (reasoning first).
    pub fn feed<S: RenderSink + ?Sized>(&mut self, event: StreamEvent, sink: &mut S) {
        if let Some(delta) = event.reasoning {
            self.reasoning.push_str(&delta);
            sink.update(Channel::Reasoning, &self.reasoning);
        }
        if let Some(delta) = event.answer {
            self.answer.push_str(&delta);
            sink.update(Channel::Answer, &self.answer);
        }
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn finish(self) -> ChannelOutput {
        ChannelOutput { reasoning: self.reasoning, answer: self.answer }
    }
}
