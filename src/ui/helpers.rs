use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::Record;

/// Repeat a short ASCII motif until it fills the requested width.
pub(crate) fn repeat_pattern_row(row: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if row.is_empty() {
        return " ".repeat(width);
    }
    let repeat_count = width / row.len() + 2;
    let mut repeated = row.repeat(repeat_count);
    repeated.truncate(width);
    repeated
}

/// Cut `text` to at most `width` characters, marking the cut with `…`.
pub(crate) fn truncate_to_width(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

/// Build the textual payload for a book card: a strip of cover art, then the
/// title, author, and the remaining details as space allows.
pub(crate) fn build_card_lines(
    record: &Record,
    pattern: &[&str],
    inner_width: u16,
    inner_height: u16,
    selected: bool,
) -> Vec<Line<'static>> {
    let width = inner_width as usize;
    let height = inner_height as usize;
    if width == 0 || height == 0 {
        return vec![Line::from("")];
    }

    let pattern_style = if selected {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title_style = if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let author = match record.author().map(str::trim) {
        Some(author) if !author.is_empty() => author.to_string(),
        _ => "Unknown author".to_string(),
    };
    let mut details = Vec::new();
    if let Some(country) = record.country() {
        details.push(country.to_string());
    }
    if !record.languages().is_empty() {
        details.push(record.languages_label());
    }
    if let Some(pages) = record.pages() {
        details.push(format!("{pages} pages"));
    }

    let mut text_lines = vec![
        Line::from(Span::styled(
            truncate_to_width(record.title().unwrap_or("Untitled"), width),
            title_style,
        )),
        Line::from(Span::styled(
            truncate_to_width(&author, width),
            Style::default().fg(Color::Gray),
        )),
    ];
    if !details.is_empty() {
        text_lines.push(Line::from(Span::styled(
            truncate_to_width(&details.join(" · "), width),
            Style::default().fg(Color::Cyan),
        )));
    }
    text_lines.truncate(height);

    let pattern_height = height - text_lines.len();
    let mut lines = Vec::with_capacity(height);
    for row_idx in 0..pattern_height {
        let row = if pattern.is_empty() {
            " ".repeat(width)
        } else {
            repeat_pattern_row(pattern[row_idx % pattern.len()], width)
        };
        lines.push(Line::from(Span::styled(row, pattern_style)));
    }
    lines.extend(text_lines);
    lines
}

/// Human label for a publication year, with BCE years spelled out.
pub(crate) fn year_label(year: Option<i32>) -> String {
    match year {
        Some(year) if year < 0 => format!("{} BCE", year.unsigned_abs()),
        Some(year) => year.to_string(),
        None => "Undated".to_string(),
    }
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordInput;
    use pretty_assertions::assert_eq;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn pattern_rows_fill_the_width() {
        assert_eq!(repeat_pattern_row("ab", 5), "ababa");
        assert_eq!(repeat_pattern_row("", 3), "   ");
        assert_eq!(repeat_pattern_row("ab", 0), "");
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_to_width("Pedro Páramo", 20), "Pedro Páramo");
        assert_eq!(truncate_to_width("Pedro Páramo", 8), "Pedro P…");
        assert_eq!(truncate_to_width("Dune", 0), "");
    }

    #[test]
    fn card_puts_text_below_the_art() {
        let record = Record::from(RecordInput {
            title: Some("Emma".to_string()),
            country: Some("United Kingdom".to_string()),
            language: vec!["English".to_string()],
            pages: Some(474),
            ..RecordInput::default()
        });
        let lines = build_card_lines(&record, &["/\\"], 30, 5, false);

        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(
            texts,
            vec![
                "/\\/\\/\\/\\/\\/\\/\\/\\/\\/\\/\\/\\/\\/\\/\\",
                "/\\/\\/\\/\\/\\/\\/\\/\\/\\/\\/\\/\\/\\/\\/\\",
                "Emma",
                "Unknown author",
                "United Kingdom · English · 47…",
            ]
        );
    }

    #[test]
    fn short_cards_keep_the_title() {
        let record = Record::from(RecordInput {
            title: Some("Emma".to_string()),
            ..RecordInput::default()
        });
        let lines = build_card_lines(&record, &["*"], 10, 1, true);
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "Emma");
    }

    #[test]
    fn years_render_with_era() {
        assert_eq!(year_label(Some(-750)), "750 BCE");
        assert_eq!(year_label(Some(1605)), "1605");
        assert_eq!(year_label(None), "Undated");
    }
}
