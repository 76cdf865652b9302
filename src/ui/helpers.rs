use ratatui::prelude::Line;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cut `s` to `max_width` display cells, marking the cut with an ellipsis.
pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for c in s.chars() {
        let cw = c.width().unwrap_or(0);
        if width + cw + 1 > max_width {
            result.push('…');
            break;
        }
        result.push(c);
        width += cw;
    }
    result
}

/// Word-wrap text to fit within a given width
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if current_width == 0 {
            current_line = word.to_string();
            current_width = word_width;
        } else if current_width + 1 + word_width <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
            current_width += 1 + word_width;
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line = word.to_string();
            current_width = word_width;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Rows a line occupies once the paragraph wraps it at `max_width`.
pub fn count_wrapped_lines(line: &Line, max_width: usize) -> usize {
    if max_width == 0 {
        return 1;
    }

    let full_text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    if full_text.is_empty() {
        return 1;
    }

    let mut line_count = 1;
    let mut current_width = 0;

    for word in full_text.split_inclusive(char::is_whitespace) {
        let word_width = word.width();

        if current_width == 0 || current_width + word_width <= max_width {
            current_width += word_width;
        } else {
            line_count += 1;
            current_width = word_width;
        }

        // Words longer than the viewport are broken mid-word
        while current_width > max_width {
            line_count += 1;
            current_width -= max_width;
        }
    }

    line_count
}

/// Break text into rows of at most `width` cells, keeping explicit newlines.
/// Editors render with this so the cursor math below matches the screen.
pub fn hard_wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for logical in text.split('\n') {
        let mut row = String::new();
        let mut row_width = 0;
        for c in logical.chars() {
            let cw = c.width().unwrap_or(0);
            if row_width + cw > width {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            row.push(c);
            row_width += cw;
        }
        rows.push(row);
    }
    rows
}

/// Row and column of a byte cursor inside `hard_wrap(text, width)`.
pub fn wrapped_cursor(text: &str, cursor: usize, width: usize) -> (usize, usize) {
    let width = width.max(1);
    let prefix = text.get(..cursor).unwrap_or(text);
    let rows = hard_wrap(prefix, width);
    let row = rows.len().saturating_sub(1);
    let col = rows.last().map(|r| r.width()).unwrap_or(0);
    if col >= width { (row + 1, 0) } else { (row, col) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::prelude::Span;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_string("model", 10), "model");
        assert_eq!(truncate_string("deepseek-reasoner", 8), "deepsee…");
    }

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("", 7), vec![""]);
    }

    #[test]
    fn wrapped_line_count() {
        let line = Line::from(vec![Span::raw("abcd "), Span::raw("efgh ijkl")]);
        assert_eq!(count_wrapped_lines(&line, 100), 1);
        assert_eq!(count_wrapped_lines(&line, 5), 3);
        assert_eq!(count_wrapped_lines(&Line::from(""), 5), 1);
    }

    #[test]
    fn hard_wrap_keeps_newlines_and_splits_long_rows() {
        assert_eq!(hard_wrap("abcdef\n\nxy", 4), vec!["abcd", "ef", "", "xy"]);
    }

    #[test]
    fn cursor_follows_wrapping() {
        assert_eq!(wrapped_cursor("abcdef", 6, 4), (1, 2));
        assert_eq!(wrapped_cursor("abcd", 4, 4), (1, 0));
        assert_eq!(wrapped_cursor("ab\ncd", 3, 10), (1, 0));
        assert_eq!(wrapped_cursor("", 0, 10), (0, 0));
    }
}
