use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::actions::Action;
use crate::infra::constants::{SCROLL_PAGE_AMOUNT, SLIDER_COARSE_STEPS};
use crate::state::{Focus, State};

/// Map a terminal event to an action. `None` means quit.
pub fn handle_event(event: &Event, state: &State) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(key, state),
        // Bracketed paste: normalize line endings, terminals may send \r\n or \r
        Event::Paste(text) => {
            let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
            Some(Action::InsertText(normalized))
        }
        _ => Some(Action::None),
    }
}

fn handle_key(key: &KeyEvent, state: &State) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    // Global Ctrl shortcuts (always handled first)
    if ctrl {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') => return None,
            KeyCode::Char('l') => return Some(Action::ClearConversation),
            KeyCode::Left => return Some(Action::CursorWordLeft),
            KeyCode::Right => return Some(Action::CursorWordRight),
            KeyCode::Backspace | KeyCode::Char('w') => return Some(Action::DeleteWordLeft),
            _ => {}
        }
    }

    // Alt+Left/Right drive the sliders; plain arrows move the cursor
    if alt {
        let slider_steps = if shift { SLIDER_COARSE_STEPS } else { 1 };
        match key.code {
            KeyCode::Left => return Some(Action::AdjustParam(-slider_steps)),
            KeyCode::Right => return Some(Action::AdjustParam(slider_steps)),
            _ => {}
        }
    }

    let action = match key.code {
        KeyCode::Esc => Action::CancelRequest,
        KeyCode::Tab | KeyCode::BackTab => Action::ToggleFocus,
        KeyCode::Enter => {
            if state.focus == Focus::Instruction || shift || alt {
                Action::InputChar('\n')
            } else {
                Action::InputSubmit
            }
        }
        KeyCode::Up => Action::SelectPrevParam,
        KeyCode::Down => Action::SelectNextParam,
        KeyCode::Left => Action::CursorLeft,
        KeyCode::Right => Action::CursorRight,
        KeyCode::PageUp => Action::ScrollUp(SCROLL_PAGE_AMOUNT),
        KeyCode::PageDown => Action::ScrollDown(SCROLL_PAGE_AMOUNT),
        KeyCode::Home => Action::CursorHome,
        KeyCode::End => Action::CursorEnd,
        KeyCode::Backspace => Action::InputBackspace,
        KeyCode::Delete => Action::InputDelete,
        KeyCode::Char(c) if !ctrl => Action::InputChar(c),
        _ => Action::None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn ctrl_q_and_ctrl_c_quit() {
        let state = State::new("m");
        assert_eq!(handle_event(&key(KeyCode::Char('q'), KeyModifiers::CONTROL), &state), None);
        assert_eq!(handle_event(&key(KeyCode::Char('c'), KeyModifiers::CONTROL), &state), None);
    }

    #[test]
    fn enter_submits_but_modified_enter_inserts_newline() {
        let state = State::new("m");
        assert_eq!(handle_event(&key(KeyCode::Enter, KeyModifiers::NONE), &state), Some(Action::InputSubmit));
        assert_eq!(handle_event(&key(KeyCode::Enter, KeyModifiers::ALT), &state), Some(Action::InputChar('\n')));
        assert_eq!(handle_event(&key(KeyCode::Enter, KeyModifiers::SHIFT), &state), Some(Action::InputChar('\n')));
    }

    #[test]
    fn enter_in_instruction_editor_is_a_newline() {
        let mut state = State::new("m");
        state.focus = Focus::Instruction;
        assert_eq!(handle_event(&key(KeyCode::Enter, KeyModifiers::NONE), &state), Some(Action::InputChar('\n')));
    }

    #[test]
    fn alt_arrows_drive_the_sliders() {
        let state = State::new("m");
        let alt_shift = KeyModifiers::ALT | KeyModifiers::SHIFT;
        assert_eq!(handle_event(&key(KeyCode::Down, KeyModifiers::NONE), &state), Some(Action::SelectNextParam));
        assert_eq!(handle_event(&key(KeyCode::Right, KeyModifiers::ALT), &state), Some(Action::AdjustParam(1)));
        assert_eq!(handle_event(&key(KeyCode::Left, alt_shift), &state), Some(Action::AdjustParam(-10)));
    }

    #[test]
    fn plain_arrows_move_the_cursor() {
        let state = State::new("m");
        assert_eq!(handle_event(&key(KeyCode::Left, KeyModifiers::NONE), &state), Some(Action::CursorLeft));
        assert_eq!(handle_event(&key(KeyCode::Right, KeyModifiers::NONE), &state), Some(Action::CursorRight));
        assert_eq!(handle_event(&key(KeyCode::Left, KeyModifiers::SHIFT), &state), Some(Action::CursorLeft));
    }

    #[test]
    fn paste_normalizes_line_endings() {
        let state = State::new("m");
        let action = handle_event(&Event::Paste("a\r\nb\rc".to_string()), &state);
        assert_eq!(action, Some(Action::InsertText("a\nb\nc".to_string())));
    }

    #[test]
    fn esc_and_ctrl_l() {
        let state = State::new("m");
        assert_eq!(handle_event(&key(KeyCode::Esc, KeyModifiers::NONE), &state), Some(Action::CancelRequest));
        assert_eq!(
            handle_event(&key(KeyCode::Char('l'), KeyModifiers::CONTROL), &state),
            Some(Action::ClearConversation)
        );
    }
}
