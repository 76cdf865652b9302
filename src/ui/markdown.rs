use ratatui::prelude::*;
use unicode_width::UnicodeWidthStr;

use super::theme;

/// Inline markers, tried in order at every position
const INLINE_MARKERS: [(&str, &str, Inline); 4] = [
    ("`", "`", Inline::Code),
    ("**", "**", Inline::Bold),
    ("__", "__", Inline::Bold),
    ("*", "*", Inline::Italic),
];

#[derive(Clone, Copy)]
enum Inline {
    Code,
    Bold,
    Italic,
}

impl Inline {
    fn style(self) -> Style {
        match self {
            Inline::Code => Style::default().fg(theme::WARNING),
            Inline::Bold => Style::default().fg(theme::TEXT).bold(),
            Inline::Italic => Style::default().fg(theme::TEXT).italic(),
        }
    }
}

pub fn is_table_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() > 1 && trimmed.starts_with('|') && trimmed.ends_with('|')
}

pub fn is_code_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Style one line of assistant markdown: headers, bullets, quotes and inline runs.
pub fn parse_markdown_line(line: &str, base_style: Style) -> Vec<Span<'static>> {
    let trimmed = line.trim_start();
    let indent = line.len() - trimmed.len();

    if trimmed.starts_with('#') {
        let level = trimmed.chars().take_while(|&c| c == '#').count();
        let content = trimmed[level..].trim_start();
        let style = match level {
            1 => Style::default().fg(theme::ACCENT).bold(),
            2 => Style::default().fg(theme::ACCENT),
            3 => Style::default().fg(theme::ACCENT).italic(),
            _ => Style::default().fg(theme::TEXT_SECONDARY).italic(),
        };
        return vec![Span::styled(content.to_string(), style)];
    }

    let bullet = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* "));
    if let Some(content) = bullet {
        let mut spans = vec![
            Span::styled(" ".repeat(indent), base_style),
            Span::styled("• ", Style::default().fg(theme::ACCENT_DIM)),
        ];
        spans.extend(parse_inline_markdown(content));
        return spans;
    }

    if let Some(content) = trimmed.strip_prefix("> ") {
        return vec![
            Span::styled(format!("{}│ ", " ".repeat(indent)), Style::default().fg(theme::BORDER)),
            Span::styled(content.to_string(), Style::default().fg(theme::TEXT_SECONDARY).italic()),
        ];
    }

    parse_inline_markdown(line)
}

/// Split text into plain and styled runs. Unclosed markers stay literal.
pub fn parse_inline_markdown(text: &str) -> Vec<Span<'static>> {
    let plain_style = Style::default().fg(theme::TEXT);
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        match styled_run(rest) {
            Some((span, consumed)) => {
                if !plain.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut plain), plain_style));
                }
                spans.push(span);
                rest = &rest[consumed..];
            }
            None => {
                plain.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    if !plain.is_empty() {
        spans.push(Span::styled(plain, plain_style));
    }
    if spans.is_empty() {
        spans.push(Span::styled("", Style::default()));
    }
    spans
}

/// A styled run starting at the head of `s`, with the bytes it covers.
fn styled_run(s: &str) -> Option<(Span<'static>, usize)> {
    if let Some(link) = link_run(s) {
        return Some(link);
    }
    for (open, close, kind) in INLINE_MARKERS {
        let Some(after) = s.strip_prefix(open) else { continue };
        let Some(end) = after.find(close) else { continue };
        let inner = &after[..end];
        if inner.is_empty() || inner.starts_with(' ') {
            continue;
        }
        return Some((Span::styled(inner.to_string(), kind.style()), open.len() + end + close.len()));
    }
    None
}

/// `[text](url)` shows only the text.
fn link_run(s: &str) -> Option<(Span<'static>, usize)> {
    let after = s.strip_prefix('[')?;
    let close = after.find("](")?;
    let label = &after[..close];
    let url_part = &after[close + 2..];
    let url_end = url_part.find(')')?;
    if label.is_empty() || label.contains(']') {
        return None;
    }
    let consumed = 1 + close + 2 + url_end + 1;
    Some((Span::styled(label.to_string(), Style::default().fg(theme::ACCENT).underlined()), consumed))
}

fn display_width(cell: &str) -> usize {
    parse_inline_markdown(cell).iter().map(|s| s.content.width()).sum()
}

fn is_separator_row(row: &[&str]) -> bool {
    row.iter().all(|cell| cell.chars().all(|ch| matches!(ch, '-' | ':' | ' ')))
}

/// Render a block of `|`-delimited rows with aligned columns.
pub fn render_markdown_table(lines: &[&str]) -> Vec<Vec<Span<'static>>> {
    let border = Style::default().fg(theme::BORDER);

    let rows: Vec<Vec<&str>> = lines
        .iter()
        .map(|line| line.trim().trim_start_matches('|').trim_end_matches('|').split('|').map(str::trim).collect())
        .collect();
    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; num_cols];
    for row in rows.iter().filter(|r| !is_separator_row(r)) {
        for (col, cell) in row.iter().enumerate() {
            widths[col] = widths[col].max(display_width(cell));
        }
    }

    rows.iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let mut spans = Vec::new();
            if is_separator_row(row) {
                for (col, width) in widths.iter().enumerate() {
                    if col > 0 {
                        spans.push(Span::styled("─┼─", border));
                    }
                    spans.push(Span::styled("─".repeat(*width), border));
                }
                return spans;
            }
            for (col, width) in widths.iter().enumerate() {
                if col > 0 {
                    spans.push(Span::styled(" │ ", border));
                }
                let cell = row.get(col).copied().unwrap_or("");
                if row_idx == 0 {
                    spans.push(Span::styled(cell.to_string(), Style::default().fg(theme::ACCENT).bold()));
                } else {
                    spans.extend(parse_inline_markdown(cell));
                }
                let padding = width.saturating_sub(display_width(cell));
                if padding > 0 {
                    spans.push(Span::raw(" ".repeat(padding)));
                }
            }
            spans
        })
        .collect()
}
