// src/app.rs

use crate::core::error::ScanError;
use crate::core::models::ScanResult;
use crate::storage::SaveReport;
use ratatui::widgets::ScrollbarState;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const SPINNER_CHARS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Lines moved by PageUp/PageDown.
const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Idle,
    Scanning,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("A scan is already running.")]
    ScanInProgress,
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// One line of feedback shown under the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Success(String),
    Error(String),
}

impl Default for StatusMessage {
    fn default() -> Self {
        Self::Info("Enter a domain and press Enter to scan.".to_string())
    }
}

/// Identifies one scan request, so late results of a cancelled scan can be told apart.
pub type ScanId = u64;

/// A scan the UI has agreed to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub id: ScanId,
    pub input: String,
}

/// What a background scan task sends back to the UI loop.
#[derive(Debug)]
pub enum ScanOutcome {
    /// `saved` is `None` when saving is turned off.
    Completed {
        result: ScanResult,
        saved: Option<SaveReport>,
    },
    Rejected(ScanError),
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub input: String,
    pub scan_result: Option<ScanResult>,
    pub report_lines: Vec<String>,
    pub scroll_offset: usize,
    pub report_scroll_state: ScrollbarState,
    pub spinner_frame: usize,
    pub status: StatusMessage,
    scan_task: Option<JoinHandle<()>>,
    active_scan: Option<ScanId>,
    next_scan_id: ScanId,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            state: AppState::Idle,
            input: String::new(),
            scan_result: None,
            report_lines: Vec::new(),
            scroll_offset: 0,
            report_scroll_state: ScrollbarState::default(),
            spinner_frame: 0,
            status: StatusMessage::default(),
            scan_task: None,
            active_scan: None,
            next_scan_id: 0,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if self.state == AppState::Idle {
            self.input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if self.state == AppState::Idle {
            self.input.pop();
        }
    }

    /// Moves to `Scanning` and hands back the text to scan, tagged with a
    /// fresh id that the outcome must carry.
    ///
    /// Empty input is refused here, before any task is spawned, and the
    /// refusal is shown on the status line.
    pub fn begin_scan(&mut self) -> Result<ScanRequest, AppError> {
        if self.state == AppState::Scanning {
            return Err(AppError::ScanInProgress);
        }
        if self.input.trim().is_empty() {
            let err = ScanError::EmptyDomain;
            self.status = StatusMessage::Error(err.to_string());
            return Err(err.into());
        }

        self.next_scan_id += 1;
        let id = self.next_scan_id;
        info!(input = %self.input, id, "Scan requested.");
        self.active_scan = Some(id);
        self.state = AppState::Scanning;
        self.spinner_frame = 0;
        self.status = StatusMessage::Info(format!("Scanning {}...", self.input.trim()));
        Ok(ScanRequest {
            id,
            input: self.input.clone(),
        })
    }

    /// Keeps the handle so the task can be aborted on quit.
    pub fn attach_task(&mut self, handle: JoinHandle<()>) {
        self.scan_task = Some(handle);
    }

    /// Applies the outcome of scan `id`. Outcomes of a scan that was
    /// cancelled or reset meanwhile are dropped; returns whether it applied.
    pub fn finish_scan(&mut self, id: ScanId, outcome: ScanOutcome) -> bool {
        if self.active_scan != Some(id) {
            debug!(id, "Discarding outcome of a cancelled scan.");
            return false;
        }
        self.active_scan = None;
        self.state = AppState::Idle;
        self.scan_task = None;

        match outcome {
            ScanOutcome::Completed { result, saved } => {
                self.report_lines = match serde_json::to_string_pretty(&result) {
                    Ok(json) => json.lines().map(str::to_string).collect(),
                    Err(e) => vec![format!("Could not render report: {}", e)],
                };
                self.scroll_offset = 0;
                self.report_scroll_state = ScrollbarState::new(self.report_lines.len());
                self.status = save_status(saved.as_ref());
                self.scan_result = Some(result);
            }
            ScanOutcome::Rejected(e) => {
                warn!(error = %e, "Scan rejected.");
                self.status = StatusMessage::Error(e.to_string());
            }
        }
        true
    }

    /// Aborts the running scan, if any. Results of an aborted scan are dropped.
    pub fn cancel_scan(&mut self) {
        if let Some(handle) = self.scan_task.take() {
            handle.abort();
            info!("Running scan aborted.");
        }
        self.active_scan = None;
        self.state = AppState::Idle;
    }

    pub fn on_tick(&mut self) {
        if self.state == AppState::Scanning {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max = self.report_lines.len().saturating_sub(1);
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(max);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn page_up(&mut self) {
        self.scroll_up(PAGE_SIZE);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(PAGE_SIZE);
    }

    pub fn quit(&mut self) {
        self.cancel_scan();
        self.should_quit = true;
    }

    pub fn reset(&mut self) {
        self.cancel_scan();
        self.input.clear();
        self.scan_result = None;
        self.report_lines.clear();
        self.scroll_offset = 0;
        self.report_scroll_state = ScrollbarState::default();
        self.spinner_frame = 0;
        self.status = StatusMessage::default();
    }
}

fn save_status(saved: Option<&SaveReport>) -> StatusMessage {
    match saved {
        None => StatusMessage::Success("Scan complete.".to_string()),
        Some(report) if !report.failures.is_empty() => {
            StatusMessage::Error(format!("Scan complete, but {}", report.failures.join("; ")))
        }
        Some(report) => {
            let paths: Vec<String> = report
                .saved
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            StatusMessage::Success(format!("Scan complete. Saved {}", paths.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::Domain;
    use crate::core::models::{
        CONNECTION_FAILED, DnsLookup, HttpResult, NOT_RESOLVED, WhoisResult, timestamp_now,
    };
    use std::path::PathBuf;
    use std::time::Duration;

    fn sample_result() -> ScanResult {
        ScanResult {
            domain: Domain::normalize("example.com"),
            timestamp: timestamp_now(),
            ip_address: NOT_RESOLVED.to_string(),
            a_records: vec![NOT_RESOLVED.to_string()],
            mx_records: DnsLookup::Empty.into_records(),
            ns_records: DnsLookup::Empty.into_records(),
            whois: WhoisResult::failed("refused"),
            http_headers: HttpResult::failed(CONNECTION_FAILED),
        }
    }

    fn completed(saved: Option<SaveReport>) -> ScanOutcome {
        ScanOutcome::Completed {
            result: sample_result(),
            saved,
        }
    }

    /// Starts a scan of example.com and returns its id.
    fn start(app: &mut App) -> ScanId {
        app.input = "example.com".to_string();
        app.begin_scan().unwrap().id
    }

    #[test]
    fn test_empty_input_is_refused_with_message() {
        let mut app = App::new();
        app.input = "   ".to_string();

        assert_eq!(app.begin_scan(), Err(AppError::Scan(ScanError::EmptyDomain)));
        assert_eq!(app.state, AppState::Idle);
        assert_eq!(
            app.status,
            StatusMessage::Error("Please enter a domain.".to_string())
        );
    }

    #[test]
    fn test_second_scan_is_refused_while_running() {
        let mut app = App::new();
        app.input = "example.com".to_string();

        let request = app.begin_scan().unwrap();
        assert_eq!(request.input, "example.com");
        assert_eq!(app.state, AppState::Scanning);
        assert_eq!(app.begin_scan(), Err(AppError::ScanInProgress));
    }

    #[test]
    fn test_each_scan_gets_a_fresh_id() {
        let mut app = App::new();
        let first = start(&mut app);
        assert!(app.finish_scan(first, completed(None)));
        let second = start(&mut app);
        assert_ne!(first, second);
    }

    #[test]
    fn test_typing_is_ignored_while_scanning() {
        let mut app = App::new();
        app.push_char('a');
        app.begin_scan().unwrap();
        app.push_char('b');
        app.pop_char();
        assert_eq!(app.input, "a");
    }

    #[test]
    fn test_finish_scan_renders_report_and_save_status() {
        let mut app = App::new();
        let id = start(&mut app);

        assert!(app.finish_scan(
            id,
            completed(Some(SaveReport {
                saved: vec![PathBuf::from("example.com_recon.json")],
                failures: Vec::new(),
            }))
        ));

        assert_eq!(app.state, AppState::Idle);
        assert!(app.scan_result.is_some());
        assert_eq!(app.report_lines.first().map(String::as_str), Some("{"));
        assert!(app.report_lines.iter().any(|l| l.contains("\"domain\": \"example.com\"")));
        assert_eq!(
            app.status,
            StatusMessage::Success("Scan complete. Saved example.com_recon.json".to_string())
        );
    }

    #[test]
    fn test_save_failures_are_surfaced() {
        let mut app = App::new();
        let id = start(&mut app);
        app.finish_scan(
            id,
            completed(Some(SaveReport {
                saved: Vec::new(),
                failures: vec!["disk full".to_string()],
            })),
        );
        assert!(matches!(app.status, StatusMessage::Error(ref m) if m.contains("disk full")));
    }

    #[test]
    fn test_rejected_scan_shows_error() {
        let mut app = App::new();
        let id = start(&mut app);
        app.finish_scan(id, ScanOutcome::Rejected(ScanError::EmptyDomain));
        assert!(app.scan_result.is_none());
        assert_eq!(
            app.status,
            StatusMessage::Error("Please enter a domain.".to_string())
        );
    }

    #[test]
    fn test_outcome_arriving_after_reset_is_discarded() {
        let mut app = App::new();
        let id = start(&mut app);

        app.reset();
        assert!(!app.finish_scan(id, completed(None)));

        assert_eq!(app.state, AppState::Idle);
        assert!(app.scan_result.is_none());
        assert!(app.report_lines.is_empty());
        assert_eq!(app.status, StatusMessage::default());
    }

    #[test]
    fn test_outcome_of_an_earlier_scan_is_discarded() {
        let mut app = App::new();
        let old = start(&mut app);
        app.cancel_scan();
        let current = start(&mut app);

        assert!(!app.finish_scan(old, completed(None)));
        assert_eq!(app.state, AppState::Scanning);
        assert!(app.finish_scan(current, completed(None)));
        assert_eq!(app.state, AppState::Idle);
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut app = App::new();
        let id = start(&mut app);
        app.finish_scan(id, completed(None));
        let last = app.report_lines.len() - 1;

        app.scroll_up(1);
        assert_eq!(app.scroll_offset, 0);
        app.page_down();
        app.page_down();
        app.page_down();
        app.scroll_down(1000);
        assert_eq!(app.scroll_offset, last);
    }

    #[test]
    fn test_spinner_only_moves_while_scanning() {
        let mut app = App::new();
        app.on_tick();
        assert_eq!(app.spinner_frame, 0);

        start(&mut app);
        for _ in 0..SPINNER_CHARS.len() + 1 {
            app.on_tick();
        }
        assert_eq!(app.spinner_frame, 1);
    }

    #[tokio::test]
    async fn test_quit_aborts_running_scan() {
        let mut app = App::new();
        start(&mut app);

        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        let abort = handle.abort_handle();
        app.attach_task(handle);

        app.quit();
        tokio::task::yield_now().await;

        assert!(app.should_quit);
        assert_eq!(app.state, AppState::Idle);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(abort.is_finished());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut app = App::new();
        let id = start(&mut app);
        app.finish_scan(id, completed(None));
        app.scroll_down(3);

        app.reset();
        assert!(app.input.is_empty());
        assert!(app.scan_result.is_none());
        assert!(app.report_lines.is_empty());
        assert_eq!(app.scroll_offset, 0);
        assert_eq!(app.status, StatusMessage::default());
    }
}
