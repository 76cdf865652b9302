use tc_base::{RequestPhase, SamplingConfig, SamplingParam, SessionState};

/// Which text field receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Query,
    Instruction,
}

/// A message shown above the input box until the next submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    /// Warnings (server said no, user cancelled) render amber; the rest red
    pub warning: bool,
}

impl Notice {
    pub fn warning(text: impl Into<String>) -> Self {
        Self { text: text.into(), warning: true }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), warning: false }
    }
}

pub struct State {
    pub input: String,
    /// Byte offset into `input`
    pub input_cursor: usize,
    /// Byte offset into the instruction text
    pub instruction_cursor: usize,
    pub focus: Focus,

    pub sampling: SamplingConfig,
    pub selected_param: SamplingParam,
    pub model: String,

    /// Display copy of the conversation. While a request runs the worker
    /// owns the real one; this copy already has the pending user turn.
    pub session: SessionState,
    pub phase: RequestPhase,
    pub live_reasoning: String,
    pub live_answer: String,
    pub notice: Option<Notice>,

    pub scroll_offset: f32,
    pub max_scroll: f32,
    pub user_scrolled: bool,
    pub scroll_accel: f32,

    pub spinner_frame: u64,
    pub dirty: bool,
}

impl State {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            input: String::new(),
            input_cursor: 0,
            instruction_cursor: 0,
            focus: Focus::Query,
            sampling: SamplingConfig::default(),
            selected_param: SamplingParam::MaxTokens,
            model: model.into(),
            session: SessionState::new(),
            phase: RequestPhase::Idle,
            live_reasoning: String::new(),
            live_answer: String::new(),
            notice: None,
            scroll_offset: 0.0,
            max_scroll: 0.0,
            user_scrolled: false,
            scroll_accel: 1.0,
            spinner_frame: 0,
            dirty: true,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_active()
    }

    /// The focused text buffer and its cursor.
    pub fn focused_text(&mut self) -> (&mut String, &mut usize) {
        match self.focus {
            Focus::Query => (&mut self.input, &mut self.input_cursor),
            Focus::Instruction => (self.sampling.instruction_mut(), &mut self.instruction_cursor),
        }
    }

    /// Forget the live buffers of the previous request.
    pub fn clear_live(&mut self) {
        self.live_reasoning.clear();
        self.live_answer.clear();
    }
}
