// src/ui/widgets/status.rs

use crate::app::{App, StatusMessage};
use ratatui::{prelude::*, widgets::Paragraph};

/// Renders the one-line status bar under the report.
pub fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match &app.status {
        StatusMessage::Info(text) => (text.as_str(), Style::default().fg(Color::Gray)),
        StatusMessage::Success(text) => (text.as_str(), Style::default().fg(Color::Green)),
        StatusMessage::Error(text) => (text.as_str(), Style::default().fg(Color::Red).bold()),
    };
    frame.render_widget(Paragraph::new(Span::styled(text, style)), area);
}
