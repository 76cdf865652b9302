mod chars;
mod conversation;
mod helpers;
mod input;
mod markdown;
mod sidebar;
mod theme;

use ratatui::{prelude::*, widgets::Block};

use crate::infra::constants::SIDEBAR_WIDTH;
use crate::state::State;

pub fn render(frame: &mut Frame, state: &mut State) {
    let area = frame.area();

    frame.render_widget(Block::default().style(Style::default().bg(theme::BG_BASE)), area);

    // Main layout: body + footer (no header)
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let body_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(SIDEBAR_WIDTH), // Sidebar
            Constraint::Min(1),                // Main content
        ])
        .split(main_layout[0]);

    sidebar::render_sidebar(frame, state, body_layout[0]);
    render_main_content(frame, state, body_layout[1]);
    input::render_status_bar(frame, state, main_layout[1]);
}

fn render_main_content(frame: &mut Frame, state: &mut State, area: Rect) {
    // Grow the input with its content
    let input_lines = state.input.split('\n').count();
    let input_height = (input_lines as u16 + 2).clamp(4, 12);
    let notice_height = input::notice_height(state, area.width);

    let content_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),                // Conversation
            Constraint::Length(notice_height), // Error or warning, if any
            Constraint::Length(input_height),  // Input area
        ])
        .split(area);

    conversation::render_conversation(frame, state, content_layout[0]);
    input::render_notice(frame, state, content_layout[1]);
    input::render_input(frame, state, content_layout[2]);
}
