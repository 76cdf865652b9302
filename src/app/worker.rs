use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use tc_base::{
    CancelToken, Channel, ChannelOutput, ChatError, Orchestrator, RenderSink, RequestPhase, SamplingConfig,
    SessionState,
};

/// Messages from the request thread to the UI loop.
#[derive(Debug)]
pub enum WorkerEvent {
    /// Only `Sending` and `Streaming`; the app sets the final phase itself
    Phase(RequestPhase),
    /// Full accumulated text of one channel
    Update(Channel, String),
    /// Always the last message; hands the session back
    Finished { session: SessionState, result: Result<ChannelOutput, ChatError> },
}

/// A [`WorkerEvent`] tagged with the request it belongs to, so the app can
/// drop messages from a request it already gave up on.
#[derive(Debug)]
pub struct WorkerMessage {
    pub request_id: u64,
    pub event: WorkerEvent,
}

/// Forwards render callbacks to the UI thread without blocking.
struct ChannelSink {
    request_id: u64,
    tx: Sender<WorkerMessage>,
}

impl ChannelSink {
    fn send(&self, event: WorkerEvent) {
        let _ = self.tx.send(WorkerMessage { request_id: self.request_id, event });
    }
}

impl RenderSink for ChannelSink {
    fn update(&mut self, channel: Channel, full_text: &str) {
        self.send(WorkerEvent::Update(channel, full_text.to_string()));
    }

    fn phase(&mut self, phase: RequestPhase) {
        // Committed/Failed would end the busy state before the session is back
        if phase.is_active() {
            self.send(WorkerEvent::Phase(phase));
        }
    }
}

/// Run one request on a background thread. The session is moved in and
/// comes back in [`WorkerEvent::Finished`].
pub fn start_request(
    request_id: u64,
    orchestrator: Arc<Orchestrator>,
    query: String,
    mut session: SessionState,
    config: SamplingConfig,
    cancel: CancelToken,
    tx: Sender<WorkerMessage>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut sink = ChannelSink { request_id, tx };
        let result = orchestrator.submit(&query, &mut session, &config, &mut sink, &cancel);
        match &result {
            Ok(output) => debug!(answer_chars = output.answer.len(), "worker finished"),
            Err(e) => error!(error = %e, "worker finished with error"),
        }
        sink.send(WorkerEvent::Finished { session, result });
    })
}
