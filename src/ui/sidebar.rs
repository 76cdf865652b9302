use ratatui::{prelude::*, widgets::Paragraph};

use tc_base::SamplingParam;

use super::input::render_editor;
use super::{chars, helpers::truncate_string, theme};
use crate::infra::constants::{INSTRUCTION_HEIGHT, SIDEBAR_HELP_HEIGHT, SLIDER_BAR_WIDTH};
use crate::state::{Focus, State};

const HELP_HINTS: [(&str, &str); 7] = [
    ("Enter", " send"),
    ("Tab", " query / instruction"),
    ("↑↓", " pick slider"),
    ("Alt+←→", " adjust (Shift ×10)"),
    ("Esc", " cancel request"),
    ("Ctrl+L", " clear conversation"),
    ("Ctrl+Q", " quit"),
];

pub fn render_sidebar(frame: &mut Frame, state: &State, area: Rect) {
    let base_style = Style::default().bg(theme::BG_BASE);

    let sidebar_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                   // Model
            Constraint::Length(INSTRUCTION_HEIGHT), // Instruction editor
            Constraint::Min(1),                      // Sliders
            Constraint::Length(SIDEBAR_HELP_HEIGHT), // Help hints
        ])
        .split(area);

    let width = area.width.saturating_sub(4) as usize;
    let header = vec![
        section_title("MODEL", base_style),
        Line::from(vec![
            Span::styled("  ", base_style),
            Span::styled(truncate_string(&state.model, width), Style::default().fg(theme::TEXT)),
        ]),
        separator(area.width),
    ];
    frame.render_widget(Paragraph::new(header).style(base_style), sidebar_layout[0]);

    let editor_area = Rect { x: area.x + 1, width: area.width.saturating_sub(2), ..sidebar_layout[1] };
    render_editor(
        frame,
        editor_area,
        " Instruction ",
        state.sampling.instruction_text(),
        state.instruction_cursor,
        state.focus == Focus::Instruction,
        " System prompt (optional)",
    );

    let mut lines = vec![Line::from(""), section_title("SAMPLING", base_style), Line::from("")];
    for param in SamplingParam::ALL {
        render_slider(&mut lines, state, param);
    }
    frame.render_widget(Paragraph::new(lines).style(base_style), sidebar_layout[2]);

    let mut help_lines = vec![Line::from("")];
    help_lines.extend(HELP_HINTS.iter().map(|(key, what)| {
        Line::from(vec![
            Span::styled("  ", base_style),
            Span::styled(*key, Style::default().fg(theme::ACCENT)),
            Span::styled(*what, Style::default().fg(theme::TEXT_MUTED)),
        ])
    }));
    frame.render_widget(Paragraph::new(help_lines).style(base_style), sidebar_layout[3]);
}

fn section_title(title: &'static str, base_style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled("  ", base_style),
        Span::styled(title, Style::default().fg(theme::TEXT_MUTED).bold()),
    ])
}

fn separator(width: u16) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {}", chars::HORIZONTAL.repeat(width.saturating_sub(2) as usize)),
        Style::default().fg(theme::BORDER),
    ))
}

/// Label row, then `◀ ████░░░░ ▶ value`.
fn render_slider(lines: &mut Vec<Line>, state: &State, param: SamplingParam) {
    let is_selected = state.selected_param == param;
    let indicator = if is_selected { chars::POINTER } else { " " };
    let label_style = if is_selected {
        Style::default().fg(theme::ACCENT).bold()
    } else {
        Style::default().fg(theme::TEXT_SECONDARY).bold()
    };
    let arrow_color = if is_selected { theme::ACCENT } else { theme::TEXT_MUTED };
    let bar_color = if is_selected { theme::ACCENT } else { theme::ACCENT_DIM };

    let filled = (state.sampling.fraction(param) * SLIDER_BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(SLIDER_BAR_WIDTH);

    lines.push(Line::from(vec![
        Span::styled(format!(" {} ", indicator), Style::default().fg(theme::ACCENT)),
        Span::styled(param.label(), label_style),
    ]));
    lines.push(Line::from(vec![
        Span::styled(format!("   {} ", chars::ARROW_LEFT), Style::default().fg(arrow_color)),
        Span::styled(chars::BLOCK_FULL.repeat(filled), Style::default().fg(bar_color)),
        Span::styled(chars::BLOCK_LIGHT.repeat(SLIDER_BAR_WIDTH - filled), Style::default().fg(theme::BG_ELEVATED)),
        Span::styled(format!(" {} ", chars::ARROW_RIGHT), Style::default().fg(arrow_color)),
        Span::styled(state.sampling.display_value(param), Style::default().fg(theme::TEXT).bold()),
    ]));
}
