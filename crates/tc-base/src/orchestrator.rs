//! Drives one request from user query to committed assistant turn.

use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::channels::{ChannelAccumulator, ChannelOutput, RenderSink, RequestPhase};
use crate::config::SamplingConfig;
use crate::error::ChatError;
use crate::request::ChatRequest;
use crate::session::SessionState;
use crate::sse::EventStream;
use crate::transport::ChatTransport;

pub struct Orchestrator {
    transport: Box<dyn ChatTransport>,
    model: String,
}

impl Orchestrator {
    pub fn new(transport: impl ChatTransport + 'static, model: impl Into<String>) -> Self {
        Self { transport: Box::new(transport), model: model.into() }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `query` and stream the reply into `sink`.
    ///
    /// The user turn is appended first and stays whatever happens. The
    /// assistant turn and its reasoning trace are committed only when the
    /// stream reaches `[DONE]`; on any error the session is left with just
    /// the user turn added.
    pub fn submit<S: RenderSink + ?Sized>(
        &self,
        query: &str,
        session: &mut SessionState,
        config: &SamplingConfig,
        sink: &mut S,
        cancel: &CancelToken,
    ) -> Result<ChannelOutput, ChatError> {
        session.append_user_turn(query);
        sink.redraw();

        match self.stream_response(session, config, sink, cancel) {
            Ok(output) => {
                session.commit_assistant_turn(output.answer.as_str(), output.reasoning.as_str());
                info!(
                    reasoning_chars = output.reasoning.len(),
                    answer_chars = output.answer.len(),
                    turns = session.transcript().len(),
                    "response committed"
                );
                sink.phase(RequestPhase::Committed);
                sink.redraw();
                Ok(output)
            }
            Err(e) => {
                warn!(error = %e, "request failed, nothing committed");
                sink.phase(RequestPhase::Failed);
                Err(e)
            }
        }
    }

    fn stream_response<S: RenderSink + ?Sized>(
        &self,
        session: &SessionState,
        config: &SamplingConfig,
        sink: &mut S,
        cancel: &CancelToken,
    ) -> Result<ChannelOutput, ChatError> {
        sink.phase(RequestPhase::Sending);
        if cancel.is_cancelled() {
            return Err(ChatError::Cancelled);
        }

        let request = ChatRequest::new(&self.model, session, config);
        info!(model = %self.model, messages = request.messages.len(), "sending chat request");
        let body = self.transport.open(&request)?;

        sink.phase(RequestPhase::Streaming);
        let mut acc = ChannelAccumulator::new();
        for event in EventStream::new(body).with_cancel(cancel.clone()) {
            acc.feed(event?, sink);
        }
        Ok(acc.finish())
    }
}
