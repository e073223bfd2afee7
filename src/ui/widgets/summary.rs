// src/ui/widgets/summary.rs

use crate::app::App;
use crate::core::models::{
    DnsRecordType, HttpResult, NO_RECORDS_FOUND, NOT_RESOLVED, ScanResult, TIMESTAMP_FORMAT,
    WhoisResult,
};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use strum::IntoEnumIterator;

/// Renders the summary panel: target, address, record counts and the
/// outcome of the WHOIS and HTTP probes.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Summary");

    let Some(result) = &app.scan_result else {
        frame.render_widget(Paragraph::new("No scan yet.").block(block), area);
        return;
    };

    let paragraph = Paragraph::new(summary_lines(result))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn summary_lines(result: &ScanResult) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from("TARGET".bold()),
        Line::from(result.domain.to_string()),
        Line::from(result.timestamp.format(TIMESTAMP_FORMAT).to_string().dark_gray()),
        Line::from(""),
        Line::from("ADDRESS".bold()),
    ];

    let address_style = if result.ip_address == NOT_RESOLVED {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };
    lines.push(Line::from(Span::styled(result.ip_address.clone(), address_style)));
    lines.push(Line::from(""));

    lines.push(Line::from("DNS".bold()));
    for record_type in DnsRecordType::iter() {
        let count = record_count(result.records(record_type));
        lines.push(Line::from(vec![
            Span::raw(format!("{:<3} ", record_type.to_string())),
            Span::styled(count.to_string(), count_style(count)),
        ]));
    }
    lines.push(Line::from(""));

    lines.push(Line::from("WHOIS".bold()));
    lines.push(match &result.whois {
        WhoisResult::Success { whois_server, .. } => Line::from(vec![
            Span::styled("✓ ", Style::default().fg(Color::Green)),
            Span::raw(whois_server.clone()),
        ]),
        WhoisResult::Error { message } => failure_line(message),
    });
    lines.push(Line::from(""));

    lines.push(Line::from("HTTP".bold()));
    match &result.http_headers {
        HttpResult::Success {
            headers,
            status_code,
            final_url,
        } => {
            lines.push(Line::from(vec![
                Span::styled("✓ ", Style::default().fg(Color::Green)),
                Span::raw(format!("{} ({} headers)", status_code, headers.len())),
            ]));
            lines.push(Line::from(final_url.clone()));
        }
        HttpResult::Error { message } => lines.push(failure_line(message)),
    }

    lines
}

fn failure_line(message: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("✗ ", Style::default().fg(Color::Red)),
        Span::raw(message.to_string()),
    ])
}

fn count_style(count: usize) -> Style {
    if count == 0 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    }
}

/// Entries other than the "no data" sentinels.
fn record_count(records: &[String]) -> usize {
    records
        .iter()
        .filter(|r| r.as_str() != NOT_RESOLVED && r.as_str() != NO_RECORDS_FOUND)
        .count()
}
