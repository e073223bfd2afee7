// src/ui/widgets/footer.rs

use crate::app::{App, AppState};
use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

fn key(label: &'static str) -> Span<'static> {
    Span::styled(label, Style::new().bold().fg(Color::Yellow))
}

/// Renders the footer widget, which displays available actions.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let spans = match app.state {
        AppState::Idle => Line::from(vec![
            key("Enter"),
            Span::raw(" scan  "),
            key("↑↓/PgUp/PgDn"),
            Span::raw(" scroll  "),
            key("Ctrl+L"),
            Span::raw(" new scan  "),
            key("Esc"),
            Span::raw(" quit"),
        ]),
        AppState::Scanning => Line::from(vec![
            Span::raw("Scanning... "),
            key("Esc"),
            Span::raw(" to abort and quit."),
        ]),
    };

    let footer = Paragraph::new(spans).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
