use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};

use tc_base::{RequestPhase, Role};

use super::helpers::{count_wrapped_lines, wrap_text};
use super::markdown::{is_code_fence, is_table_row, parse_markdown_line, render_markdown_table};
use super::{chars, theme};
use crate::state::State;

/// Icon, label and the space after them
const PREFIX_WIDTH: usize = 8;

pub fn render_conversation(frame: &mut Frame, state: &mut State, area: Rect) {
    let base_style = Style::default().bg(theme::BG_SURFACE);

    let inner_area = Rect::new(area.x + 1, area.y, area.width.saturating_sub(2), area.height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::BORDER))
        .style(base_style)
        .title(Span::styled(
            if state.is_busy() { " Conversation ● " } else { " Conversation " },
            Style::default().fg(theme::ACCENT).bold(),
        ))
        .title_alignment(Alignment::Left);

    let content_area = block.inner(inner_area);
    frame.render_widget(block, inner_area);

    let viewport_width = content_area.width as usize;
    let viewport_height = content_area.height as usize;
    let text = build_lines(state, viewport_width.saturating_sub(PREFIX_WIDTH + 1));

    let content_height: usize = text.iter().map(|line| count_wrapped_lines(line, viewport_width)).sum();

    let max_scroll = content_height.saturating_sub(viewport_height) as f32;
    state.max_scroll = max_scroll;

    // Reaching the bottom again re-enables follow mode
    if state.user_scrolled && state.scroll_offset >= max_scroll - 0.5 {
        state.user_scrolled = false;
    }
    if !state.user_scrolled {
        state.scroll_offset = max_scroll;
    }
    state.scroll_offset = state.scroll_offset.clamp(0.0, max_scroll);

    let paragraph = Paragraph::new(text)
        .style(base_style)
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset.round() as u16, 0));
    frame.render_widget(paragraph, content_area);

    if content_height > viewport_height {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .style(Style::default().fg(theme::BG_ELEVATED))
            .thumb_style(Style::default().fg(theme::ACCENT_DIM));

        let mut scrollbar_state =
            ScrollbarState::new(max_scroll as usize).position(state.scroll_offset.round() as usize);

        frame.render_stateful_widget(
            scrollbar,
            inner_area.inner(Margin { horizontal: 0, vertical: 1 }),
            &mut scrollbar_state,
        );
    }
}

/// Committed history followed by the in-flight (or failed) response.
fn build_lines(state: &State, wrap_width: usize) -> Vec<Line<'static>> {
    let mut text: Vec<Line<'static>> = Vec::new();
    let has_live = !state.live_reasoning.is_empty() || !state.live_answer.is_empty();

    if state.session.is_empty() && !state.is_busy() && !has_live {
        text.push(Line::from(""));
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            "  Start a conversation by typing below",
            Style::default().fg(theme::TEXT_MUTED).italic(),
        )));
        return text;
    }

    for entry in state.session.history() {
        match entry.turn.role {
            Role::User => push_user(&mut text, &entry.turn.content, wrap_width),
            Role::Assistant => {
                if let Some(trace) = entry.reasoning {
                    push_thinking(&mut text, trace, wrap_width, false);
                }
                push_assistant(&mut text, &entry.turn.content);
            }
        }
        text.push(Line::from(""));
    }

    let failed_with_output = state.phase == RequestPhase::Failed && has_live;
    if state.is_busy() || failed_with_output {
        if !state.live_reasoning.is_empty() {
            push_thinking(&mut text, &state.live_reasoning, wrap_width, state.live_answer.is_empty());
        }
        if !state.live_answer.is_empty() {
            push_assistant(&mut text, &state.live_answer);
        } else if state.is_busy() && state.live_reasoning.is_empty() {
            text.push(Line::from(vec![
                role_prefix(Role::Assistant),
                Span::styled(
                    format!("{} waiting for the model...", chars::spinner(state.spinner_frame)),
                    Style::default().fg(theme::TEXT_MUTED).italic(),
                ),
            ]));
        }
        if failed_with_output {
            text.push(Line::from(vec![
                indent(),
                Span::styled(
                    "partial response, not kept in the conversation",
                    Style::default().fg(theme::ERROR).italic(),
                ),
            ]));
        }
    }

    // Padding at end for scroll
    for _ in 0..3 {
        text.push(Line::from(""));
    }
    text
}

fn role_prefix(role: Role) -> Span<'static> {
    let (icon, label, color) = match role {
        Role::User => (chars::POINTER, "You", theme::USER),
        Role::Assistant => (chars::DOT, "Model", theme::ASSISTANT),
    };
    Span::styled(format!("{} {:<5} ", icon, label), Style::default().fg(color).bold())
}

fn indent() -> Span<'static> {
    Span::raw(" ".repeat(PREFIX_WIDTH))
}

fn push_user(text: &mut Vec<Line<'static>>, content: &str, wrap_width: usize) {
    let mut first = true;
    for line in content.lines() {
        for row in wrap_text(line, wrap_width) {
            let lead = if first { role_prefix(Role::User) } else { indent() };
            first = false;
            text.push(Line::from(vec![lead, Span::styled(row, Style::default().fg(theme::TEXT))]));
        }
    }
    if first {
        text.push(Line::from(role_prefix(Role::User)));
    }
}

/// Reasoning trace in its own muted block, set apart from the answer.
fn push_thinking(text: &mut Vec<Line<'static>>, trace: &str, wrap_width: usize, live: bool) {
    let style = Style::default().fg(theme::REASONING).italic();
    let title = if live { "Thinking..." } else { "Thinking" };
    text.push(Line::from(vec![indent(), Span::styled(title, Style::default().fg(theme::REASONING).bold())]));
    for line in trace.lines() {
        for row in wrap_text(line, wrap_width.saturating_sub(2)) {
            text.push(Line::from(vec![
                indent(),
                Span::styled(format!("{} ", chars::VERTICAL_LIGHT), Style::default().fg(theme::BORDER)),
                Span::styled(row, style),
            ]));
        }
    }
}

/// The role prefix on the first row of a message, blank indent after.
fn lead(first: &mut bool) -> Span<'static> {
    if std::mem::take(first) { role_prefix(Role::Assistant) } else { indent() }
}

fn push_assistant(text: &mut Vec<Line<'static>>, content: &str) {
    let lines: Vec<&str> = content.lines().collect();
    let mut first = true;
    let mut in_code = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if is_code_fence(line) {
            in_code = !in_code;
            let fence = Span::styled(line.trim().to_string(), Style::default().fg(theme::BORDER));
            text.push(Line::from(vec![lead(&mut first), fence]));
            i += 1;
            continue;
        }
        if in_code {
            let code = Span::styled(line.to_string(), Style::default().fg(theme::WARNING));
            text.push(Line::from(vec![lead(&mut first), code]));
            i += 1;
            continue;
        }

        if is_table_row(line) {
            let end = lines[i..].iter().position(|l| !is_table_row(l)).map_or(lines.len(), |n| i + n);
            for row_spans in render_markdown_table(&lines[i..end]) {
                let mut spans = vec![lead(&mut first)];
                spans.extend(row_spans);
                text.push(Line::from(spans));
            }
            i = end;
            continue;
        }

        let mut spans = vec![lead(&mut first)];
        spans.extend(parse_markdown_line(line, Style::default().bg(theme::BG_SURFACE)));
        text.push(Line::from(spans));
        i += 1;
    }

    if first {
        text.push(Line::from(role_prefix(Role::Assistant)));
    }
}
