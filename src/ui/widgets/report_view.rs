// src/ui/widgets/report_view.rs

use crate::app::{App, AppState, SPINNER_CHARS};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation},
};

/// Renders the report panel: instructions, a spinner, or the last report as JSON.
pub fn render_report_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let main_block = Block::default()
        .borders(Borders::ALL)
        .title("Scan Report (Navigate with ↑ ↓)");

    if app.state == AppState::Scanning {
        let spinner_char = SPINNER_CHARS[app.spinner_frame % SPINNER_CHARS.len()];
        let content = Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", spinner_char), Style::default().fg(Color::Cyan)),
            Span::raw("Scanning... Please wait."),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(content.block(main_block), area);
        return;
    }

    if app.report_lines.is_empty() {
        let content = Paragraph::new(vec![
            Line::from("Scan results will appear here..."),
            Line::from(""),
            Line::from("Type a domain (e.g. example.com) and press Enter."),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(content.block(main_block), area);
        return;
    }

    let lines: Vec<Line> = app.report_lines.iter().map(|l| json_line(l)).collect();
    let report = Paragraph::new(lines)
        .block(main_block)
        .scroll((app.scroll_offset as u16, 0));
    frame.render_widget(report, area);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"));
    frame.render_stateful_widget(
        scrollbar,
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut app.report_scroll_state,
    );
}

/// Colors the key of a `"key": value` line; other lines are left plain.
fn json_line(line: &str) -> Line<'_> {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];

    match trimmed.split_once("\": ") {
        Some((key, value)) if trimmed.starts_with('"') => Line::from(vec![
            Span::raw(indent),
            Span::styled(format!("{}\"", key), Style::default().fg(Color::Cyan)),
            Span::raw(": "),
            Span::styled(value, Style::default().fg(Color::Green)),
        ]),
        _ => Line::from(line),
    }
}
