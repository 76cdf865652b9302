use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use tc_base::{RequestPhase, SamplingParam};

use super::helpers::{hard_wrap, wrapped_cursor};
use super::{chars, theme};
use crate::state::{Focus, State};

/// A bordered multi-line text field. Rows are hard-wrapped so the terminal
/// cursor can be placed exactly; the view follows the cursor.
pub fn render_editor(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    text: &str,
    cursor: usize,
    focused: bool,
    placeholder: &str,
) {
    let border_color = if focused { theme::BORDER_FOCUS } else { theme::BORDER };
    let title_color = if focused { theme::ACCENT } else { theme::TEXT_MUTED };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme::BG_INPUT))
        .title(Span::styled(title.to_string(), Style::default().fg(title_color)));

    let content_area = block.inner(area);
    frame.render_widget(block, area);

    if text.is_empty() {
        let hint = Line::from(Span::styled(placeholder.to_string(), Style::default().fg(theme::TEXT_MUTED).italic()));
        frame.render_widget(Paragraph::new(hint), content_area);
        if focused {
            frame.set_cursor_position(Position::new(content_area.x + 1, content_area.y));
        }
        return;
    }

    // One column of left padding
    let width = content_area.width.saturating_sub(1) as usize;
    let height = content_area.height as usize;
    let (row, col) = wrapped_cursor(text, cursor, width);
    let scroll = row.saturating_sub(height.saturating_sub(1));

    let lines: Vec<Line> = hard_wrap(text, width)
        .into_iter()
        .map(|row| Line::from(vec![Span::raw(" "), Span::styled(row, Style::default().fg(theme::TEXT))]))
        .collect();
    frame.render_widget(Paragraph::new(lines).scroll((scroll as u16, 0)), content_area);

    if focused {
        frame.set_cursor_position(Position::new(
            content_area.x + 1 + col as u16,
            content_area.y + (row - scroll) as u16,
        ));
    }
}

pub fn render_input(frame: &mut Frame, state: &State, area: Rect) {
    let inner_area = Rect::new(area.x + 1, area.y, area.width.saturating_sub(2), area.height);
    let title = if state.is_busy() { " Streaming... " } else { " Message " };
    render_editor(
        frame,
        inner_area,
        title,
        &state.input,
        state.input_cursor,
        state.focus == Focus::Query,
        " Type your message here...",
    );
}

/// Rows the notice box needs, borders included.
pub fn notice_height(state: &State, width: u16) -> u16 {
    let Some(notice) = &state.notice else { return 0 };
    let inner = width.saturating_sub(4).max(1) as usize;
    let rows: usize = notice.text.lines().map(|l| l.width().div_ceil(inner).max(1)).sum();
    (rows as u16 + 2).clamp(3, 8)
}

pub fn render_notice(frame: &mut Frame, state: &State, area: Rect) {
    let Some(notice) = &state.notice else { return };
    let color = if notice.warning { theme::WARNING } else { theme::ERROR };
    let inner_area = Rect::new(area.x + 1, area.y, area.width.saturating_sub(2), area.height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::BG_SURFACE))
        .title(Span::styled(if notice.warning { " Warning " } else { " Error " }, Style::default().fg(color).bold()));

    let paragraph = Paragraph::new(notice.text.as_str())
        .style(Style::default().fg(theme::TEXT))
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, inner_area);
}

pub fn render_status_bar(frame: &mut Frame, state: &State, area: Rect) {
    let base_style = Style::default().bg(theme::BG_BASE).fg(theme::TEXT_MUTED);

    let badge = match state.phase {
        RequestPhase::Sending | RequestPhase::Streaming => Span::styled(
            format!(" {} {} ", chars::spinner(state.spinner_frame), state.phase.label()),
            Style::default().fg(theme::BG_BASE).bg(theme::SUCCESS).bold(),
        ),
        RequestPhase::Failed => {
            Span::styled(" FAILED ", Style::default().fg(theme::BG_BASE).bg(theme::ERROR).bold())
        }
        phase => Span::styled(
            format!(" {} ", phase.label()),
            Style::default().fg(theme::BG_BASE).bg(theme::TEXT_MUTED).bold(),
        ),
    };

    let mut spans = vec![Span::styled(" ", base_style), badge, Span::styled(" ", base_style)];
    spans.push(Span::styled(
        format!(" {} ", state.model),
        Style::default().fg(theme::TEXT).bg(theme::BG_ELEVATED),
    ));
    spans.push(Span::styled(" ", base_style));

    let sampling = &state.sampling;
    spans.push(Span::styled(
        format!(
            " T {}  P {}  K {}  max {} ",
            sampling.display_value(SamplingParam::Temperature),
            sampling.display_value(SamplingParam::TopP),
            sampling.display_value(SamplingParam::TopK),
            sampling.display_value(SamplingParam::MaxTokens),
        ),
        Style::default().fg(theme::TEXT_SECONDARY),
    ));

    let turns = state.session.assistant_turns();
    if turns > 0 {
        spans.push(Span::styled(
            format!(" {} {} ", turns, if turns == 1 { "turn" } else { "turns" }),
            Style::default().fg(theme::BG_BASE).bg(theme::ACCENT_DIM).bold(),
        ));
    }

    // Right side: character count of the pending message
    let right = format!("{} chars ", state.input.chars().count());
    let left_width: usize = spans.iter().map(|s| s.content.width()).sum();
    let padding = (area.width as usize).saturating_sub(left_width + right.width());
    spans.push(Span::styled(" ".repeat(padding), base_style));
    spans.push(Span::styled(right, base_style));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(base_style), area);
}
