use std::io;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crossterm::event;
use ratatui::prelude::*;
use tracing::{debug, info, warn};

use tc_base::{CancelToken, Channel, ChatError, Orchestrator, RequestPhase};

use crate::app::actions::{ActionResult, apply_action};
use crate::app::events::handle_event;
use crate::app::worker::{WorkerEvent, WorkerMessage, start_request};
use crate::infra::constants::{EVENT_POLL_MS, IDLE_POLL_MS, RENDER_THROTTLE_MS, SPINNER_FRAME_MS};
use crate::state::{Notice, State};
use crate::ui;

/// The request currently lent to a worker thread.
struct InFlight {
    id: u64,
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

pub struct App {
    pub state: State,
    orchestrator: Arc<Orchestrator>,
    in_flight: Option<InFlight>,
    next_request_id: u64,
    /// Last render time for throttling
    last_render_ms: u64,
    /// Last spinner animation update time
    last_spinner_ms: u64,
}

impl App {
    pub fn new(state: State, orchestrator: Orchestrator) -> Self {
        Self {
            state,
            orchestrator: Arc::new(orchestrator),
            in_flight: None,
            next_request_id: 1,
            last_render_ms: 0,
            last_spinner_ms: 0,
        }
    }

    pub fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tx: Sender<WorkerMessage>,
        rx: Receiver<WorkerMessage>,
    ) -> io::Result<()> {
        loop {
            let current_ms = now_ms();

            // === INPUT FIRST: Process user input with minimal latency ===
            if event::poll(Duration::ZERO)? {
                let evt = event::read()?;
                let Some(action) = handle_event(&evt, &self.state) else {
                    self.cancel_in_flight();
                    break;
                };
                self.handle_action(action, &tx);
                self.state.dirty = true;

                // Render immediately after input for instant feedback
                terminal.draw(|frame| ui::render(frame, &mut self.state))?;
                self.state.dirty = false;
                self.last_render_ms = current_ms;
            }

            // === BACKGROUND PROCESSING ===
            self.process_worker_events(&rx);
            self.check_worker_alive(&rx);
            self.update_spinner_animation(current_ms);

            // Render if dirty and enough time has passed
            if self.state.dirty && current_ms.saturating_sub(self.last_render_ms) >= RENDER_THROTTLE_MS {
                terminal.draw(|frame| ui::render(frame, &mut self.state))?;
                self.state.dirty = false;
                self.last_render_ms = current_ms;
            }

            // Adaptive poll: sleep longer when idle, shorter when a request is running
            let poll_ms = if self.state.is_busy() || self.state.dirty { EVENT_POLL_MS } else { IDLE_POLL_MS };
            let _ = event::poll(Duration::from_millis(poll_ms))?;
        }

        Ok(())
    }

    fn handle_action(&mut self, action: crate::app::actions::Action, tx: &Sender<WorkerMessage>) {
        match apply_action(&mut self.state, action) {
            ActionResult::Nothing => {}
            ActionResult::StartRequest(query) => self.start(query, tx),
            ActionResult::CancelRequest => self.abandon_in_flight(),
        }
    }

    fn start(&mut self, query: String, tx: &Sender<WorkerMessage>) {
        if self.in_flight.is_some() {
            warn!("refusing to start a request while another one holds the session");
            return;
        }
        let id = self.next_request_id;
        self.next_request_id += 1;

        let session = self.state.session.clone();
        // Mirror what the worker does first, so the display shows the turn right away
        self.state.session.append_user_turn(query.as_str());
        self.state.clear_live();
        self.state.phase = RequestPhase::Sending;

        let cancel = CancelToken::new();
        let handle = start_request(
            id,
            Arc::clone(&self.orchestrator),
            query,
            session,
            self.state.sampling.clone(),
            cancel.clone(),
            tx.clone(),
        );
        self.in_flight = Some(InFlight { id, cancel, handle });
    }

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = &self.in_flight {
            in_flight.cancel.cancel();
        }
    }

    /// Cancel and stop waiting for the worker. A stalled read may keep it
    /// alive until the request timeout; whatever it sends later is dropped.
    /// The display copy of the session already ends with the user turn.
    fn abandon_in_flight(&mut self) {
        let Some(in_flight) = self.in_flight.take() else { return };
        info!(request = in_flight.id, "user cancelled request");
        in_flight.cancel.cancel();
        self.finish(Err(ChatError::Cancelled));
        self.state.dirty = true;
    }

    fn process_worker_events(&mut self, rx: &Receiver<WorkerMessage>) {
        while let Ok(message) = rx.try_recv() {
            self.handle_worker_message(message);
        }
    }

    fn handle_worker_message(&mut self, message: WorkerMessage) {
        if self.in_flight.as_ref().map(|f| f.id) != Some(message.request_id) {
            debug!(request = message.request_id, "dropping message from an abandoned request");
            return;
        }
        self.state.dirty = true;
        match message.event {
            WorkerEvent::Phase(phase) => self.state.phase = phase,
            WorkerEvent::Update(Channel::Reasoning, text) => self.state.live_reasoning = text,
            WorkerEvent::Update(Channel::Answer, text) => self.state.live_answer = text,
            WorkerEvent::Finished { session, result } => {
                self.in_flight = None;
                self.state.session = session;
                self.finish(result);
            }
        }
    }

    fn finish(&mut self, result: Result<tc_base::ChannelOutput, ChatError>) {
        match result {
            Ok(_) => {
                // The committed turn now lives in the history
                self.state.clear_live();
                self.state.phase = RequestPhase::Committed;
            }
            Err(e) => {
                self.state.phase = RequestPhase::Failed;
                self.state.notice = Some(if e.is_warning() {
                    Notice::warning(e.user_message())
                } else {
                    Notice::error(e.user_message())
                });
            }
        }
    }

    /// Recover if the worker thread died without handing the session back.
    fn check_worker_alive(&mut self, rx: &Receiver<WorkerMessage>) {
        let finished = self.in_flight.as_ref().is_some_and(|f| f.handle.is_finished());
        if !finished {
            return;
        }
        // The final message may have been sent just before the thread exited
        self.process_worker_events(rx);
        if let Some(in_flight) = self.in_flight.take() {
            let _ = in_flight.handle.join();
            warn!("request worker exited without reporting back");
            // The display copy already holds the user turn, which is what a
            // failed request leaves behind
            self.finish(Err(ChatError::Transport("request worker stopped unexpectedly".to_string())));
            self.state.dirty = true;
        }
    }

    fn update_spinner_animation(&mut self, current_ms: u64) {
        if self.state.is_busy() && current_ms.saturating_sub(self.last_spinner_ms) >= SPINNER_FRAME_MS {
            self.last_spinner_ms = current_ms;
            self.state.spinner_frame = self.state.spinner_frame.wrapping_add(1);
            self.state.dirty = true;
        }
    }
}

pub fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::sync::mpsc;
    use std::thread;

    use tc_base::request::ChatRequest;
    use tc_base::transport::BodyReader;
    use tc_base::{ChatTransport, SessionState};

    use crate::app::actions::Action;

    /// Answers every request with the same complete stream.
    struct Fixed(&'static str);

    impl ChatTransport for Fixed {
        fn open(&self, _request: &ChatRequest<'_>) -> Result<BodyReader, ChatError> {
            Ok(Box::new(Cursor::new(self.0.as_bytes().to_vec())))
        }
    }

    /// Never answers until the test drops the sender, like a stalled server.
    struct Stalled(Mutex<Receiver<()>>);

    impl ChatTransport for Stalled {
        fn open(&self, _request: &ChatRequest<'_>) -> Result<BodyReader, ChatError> {
            if let Ok(gate) = self.0.lock() {
                let _ = gate.recv();
            }
            Err(ChatError::Transport("connection closed".to_string()))
        }
    }

    const ANSWER: &str = concat!(
        "data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"r1\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"answer1\"}}]}\n",
        "data: [DONE]\n",
    );

    fn submit(app: &mut App, text: &str, tx: &Sender<WorkerMessage>) {
        app.state.input = text.to_string();
        app.state.input_cursor = text.len();
        app.handle_action(Action::InputSubmit, tx);
    }

    fn wait_for_worker(app: &App) {
        while !app.in_flight.as_ref().is_some_and(|f| f.handle.is_finished()) {
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn contents(session: &SessionState) -> Vec<String> {
        session.transcript().iter().map(|t| t.content.clone()).collect()
    }

    #[test]
    fn app_stays_busy_until_the_session_comes_back() {
        let mut app = App::new(State::new("m"), Orchestrator::new(Fixed(ANSWER), "m"));
        let (tx, rx) = mpsc::channel();

        submit(&mut app, "first", &tx);
        wait_for_worker(&app);
        let mut messages: Vec<WorkerMessage> = rx.try_iter().collect();
        let finished = messages.pop().unwrap();
        assert!(matches!(finished.event, WorkerEvent::Finished { .. }));

        // Everything before the hand-back: the request still owns the session
        for message in messages {
            app.handle_worker_message(message);
        }
        assert!(app.state.is_busy());
        assert_eq!(app.state.live_answer, "answer1");

        submit(&mut app, "second", &tx);
        assert_eq!(app.state.input, "second");
        assert!(app.state.notice.as_ref().is_some_and(|n| n.warning));

        app.handle_worker_message(finished);
        assert!(!app.state.is_busy());
        assert!(app.in_flight.is_none());
        assert_eq!(app.state.phase, RequestPhase::Committed);
        assert_eq!(contents(&app.state.session), vec!["first", "answer1"]);
        assert_eq!(app.state.session.reasoning_traces(), &["r1".to_string()]);
    }

    #[test]
    fn cancel_returns_control_without_waiting_for_a_stalled_worker() {
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let mut app = App::new(State::new("m"), Orchestrator::new(Stalled(Mutex::new(gate_rx)), "m"));
        let (tx, rx) = mpsc::channel();

        submit(&mut app, "q", &tx);
        assert!(app.state.is_busy());
        app.handle_action(Action::CancelRequest, &tx);

        assert!(app.in_flight.is_none());
        assert_eq!(app.state.phase, RequestPhase::Failed);
        assert!(app.state.notice.as_ref().is_some_and(|n| n.warning));
        assert_eq!(contents(&app.state.session), vec!["q"]);

        // A late hand-back from the abandoned request must not touch the session
        let mut stale = SessionState::new();
        stale.append_user_turn("q");
        stale.commit_assistant_turn("late", "");
        app.handle_worker_message(WorkerMessage {
            request_id: 1,
            event: WorkerEvent::Finished { session: stale, result: Err(ChatError::Cancelled) },
        });
        assert_eq!(contents(&app.state.session), vec!["q"]);
        assert_eq!(app.state.phase, RequestPhase::Failed);

        drop(gate_tx);
        app.process_worker_events(&rx);
        assert_eq!(contents(&app.state.session), vec!["q"]);
    }

    #[test]
    fn stale_messages_do_not_end_the_next_request() {
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let mut app = App::new(State::new("m"), Orchestrator::new(Stalled(Mutex::new(gate_rx)), "m"));
        let (tx, _rx) = mpsc::channel();

        submit(&mut app, "one", &tx);
        app.handle_action(Action::CancelRequest, &tx);
        submit(&mut app, "two", &tx);
        assert!(app.in_flight.as_ref().is_some_and(|f| f.id == 2));

        app.handle_worker_message(WorkerMessage {
            request_id: 1,
            event: WorkerEvent::Finished { session: SessionState::new(), result: Err(ChatError::Cancelled) },
        });
        assert!(app.in_flight.is_some());
        assert!(app.state.is_busy());
        assert_eq!(contents(&app.state.session), vec!["one", "two"]);

        drop(gate_tx);
    }
}
