use tc_base::RequestPhase;

use crate::infra::constants::{SCROLL_ACCEL_INCREMENT, SCROLL_ACCEL_MAX};
use crate::state::{Focus, Notice, State};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    InputChar(char),
    InsertText(String),
    InputBackspace,
    InputDelete,
    CursorLeft,
    CursorRight,
    CursorWordLeft,
    CursorWordRight,
    DeleteWordLeft,
    CursorHome,
    CursorEnd,
    InputSubmit,
    ToggleFocus,
    SelectNextParam,
    SelectPrevParam,
    AdjustParam(i32),
    ClearConversation,
    CancelRequest,
    ScrollUp(f32),
    ScrollDown(f32),
    None,
}

/// Side effects the app loop has to carry out after an action.
#[derive(Debug, PartialEq)]
pub enum ActionResult {
    Nothing,
    StartRequest(String),
    CancelRequest,
}

pub fn apply_action(state: &mut State, action: Action) -> ActionResult {
    // Reset scroll acceleration on non-scroll actions
    if !matches!(action, Action::ScrollUp(_) | Action::ScrollDown(_)) {
        state.scroll_accel = 1.0;
    }

    match action {
        Action::InputChar(c) => {
            let (text, cursor) = state.focused_text();
            text.insert(*cursor, c);
            *cursor += c.len_utf8();
        }
        Action::InsertText(s) => {
            let (text, cursor) = state.focused_text();
            text.insert_str(*cursor, &s);
            *cursor += s.len();
        }
        Action::InputBackspace => {
            let (text, cursor) = state.focused_text();
            if *cursor > 0 {
                let prev = text[..*cursor].char_indices().last().map(|(i, _)| i).unwrap_or(0);
                text.remove(prev);
                *cursor = prev;
            }
        }
        Action::InputDelete => {
            let (text, cursor) = state.focused_text();
            if *cursor < text.len() {
                text.remove(*cursor);
            }
        }
        Action::CursorLeft => {
            let (text, cursor) = state.focused_text();
            *cursor = text[..*cursor].char_indices().last().map(|(i, _)| i).unwrap_or(0);
        }
        Action::CursorRight => {
            let (text, cursor) = state.focused_text();
            *cursor += text[*cursor..].chars().next().map(char::len_utf8).unwrap_or(0);
        }
        Action::CursorWordLeft => {
            let (text, cursor) = state.focused_text();
            *cursor = word_start_before(text, *cursor);
        }
        Action::CursorWordRight => {
            let (text, cursor) = state.focused_text();
            if *cursor < text.len() {
                let after = &text[*cursor..];
                let skip_word = after.find(|c: char| c.is_whitespace()).unwrap_or(after.len());
                let remaining = &after[skip_word..];
                let skip_space = remaining.find(|c: char| !c.is_whitespace()).unwrap_or(remaining.len());
                *cursor += skip_word + skip_space;
            }
        }
        Action::DeleteWordLeft => {
            let (text, cursor) = state.focused_text();
            let start = word_start_before(text, *cursor);
            text.replace_range(start..*cursor, "");
            *cursor = start;
        }
        Action::CursorHome => {
            let (text, cursor) = state.focused_text();
            *cursor = text[..*cursor].rfind('\n').map(|i| i + 1).unwrap_or(0);
        }
        Action::CursorEnd => {
            let (text, cursor) = state.focused_text();
            let after = &text[*cursor..];
            *cursor += after.find('\n').unwrap_or(after.len());
        }
        Action::InputSubmit => return handle_input_submit(state),
        Action::ToggleFocus => {
            state.focus = match state.focus {
                Focus::Query => Focus::Instruction,
                Focus::Instruction => Focus::Query,
            };
        }
        Action::SelectNextParam => state.selected_param = state.selected_param.next(),
        Action::SelectPrevParam => state.selected_param = state.selected_param.prev(),
        Action::AdjustParam(steps) => state.sampling.adjust(state.selected_param, steps),
        Action::ClearConversation => handle_clear_conversation(state),
        Action::CancelRequest => {
            if state.is_busy() {
                return ActionResult::CancelRequest;
            }
        }
        Action::ScrollUp(amount) => {
            let accel_amount = amount * state.scroll_accel;
            state.scroll_offset = (state.scroll_offset - accel_amount).max(0.0);
            state.user_scrolled = true;
            state.scroll_accel = (state.scroll_accel + SCROLL_ACCEL_INCREMENT).min(SCROLL_ACCEL_MAX);
        }
        Action::ScrollDown(amount) => {
            let accel_amount = amount * state.scroll_accel;
            state.scroll_offset += accel_amount;
            state.scroll_accel = (state.scroll_accel + SCROLL_ACCEL_INCREMENT).min(SCROLL_ACCEL_MAX);
        }
        Action::None => {}
    }
    ActionResult::Nothing
}

/// Byte offset of the start of the word left of `cursor`.
fn word_start_before(text: &str, cursor: usize) -> usize {
    let trimmed = text[..cursor].trim_end();
    trimmed.rfind(|c: char| c.is_whitespace()).map(|i| i + 1).unwrap_or(0)
}

fn handle_input_submit(state: &mut State) -> ActionResult {
    if state.input.trim().is_empty() {
        return ActionResult::Nothing;
    }
    if state.is_busy() {
        state.notice = Some(Notice::warning("A response is still streaming. Press Esc to cancel it."));
        return ActionResult::Nothing;
    }

    let query = std::mem::take(&mut state.input);
    state.input_cursor = 0;
    state.notice = None;
    state.user_scrolled = false;
    ActionResult::StartRequest(query)
}

fn handle_clear_conversation(state: &mut State) {
    if state.is_busy() {
        state.notice = Some(Notice::warning("Cannot clear while a response is streaming."));
        return;
    }
    state.session.reset();
    state.clear_live();
    state.phase = RequestPhase::Idle;
    state.notice = None;
    state.scroll_offset = 0.0;
    state.user_scrolled = false;
}
