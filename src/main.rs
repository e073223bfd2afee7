// src/main.rs

use clap::Parser;
use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

mod app;
mod config;
mod core;
mod logging;
mod storage;
mod ui;

use crate::app::{App, ScanId, ScanOutcome};
use crate::config::ReconConfig;
use crate::core::scanner::Scanner;

/// Passive reconnaissance for a single domain: DNS, WHOIS and HTTP headers.
#[derive(Debug, Parser)]
#[command(name = "recon-lite", version, about)]
struct Args {
    /// Domain to scan. Without it the interactive interface starts.
    domain: Option<String>,

    /// Directory for the JSON and CSV result files.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Do not write result files.
    #[arg(long)]
    no_save: bool,

    /// Timeout for each DNS lookup, e.g. 5s or 1m.
    #[arg(long, value_name = "T", value_parser = parse_duration)]
    dns_timeout: Option<Duration>,

    /// Timeout for the WHOIS exchange.
    #[arg(long, value_name = "T", value_parser = parse_duration)]
    whois_timeout: Option<Duration>,

    /// Timeout for each HTTP attempt.
    #[arg(long, value_name = "T", value_parser = parse_duration)]
    http_timeout: Option<Duration>,

    /// WHOIS server to query.
    #[arg(long, value_name = "HOST")]
    whois_server: Option<String>,

    /// Ignore HTTP(S)_PROXY for the HTTP probe.
    #[arg(long)]
    no_proxy: bool,
}

impl Args {
    /// Flags win over the environment and the defaults.
    fn apply(&self, mut config: ReconConfig) -> ReconConfig {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.no_save {
            config.save_results = false;
        }
        if let Some(t) = self.dns_timeout {
            config.dns_timeout = t;
        }
        if let Some(t) = self.whois_timeout {
            config.whois_timeout = t;
        }
        if let Some(t) = self.http_timeout {
            config.http_timeout = t;
        }
        if let Some(server) = &self.whois_server {
            config.whois_server = server.clone();
        }
        if self.no_proxy {
            config.use_proxy = false;
        }
        config
    }
}

fn parse_duration(raw: &str) -> Result<Duration, String> {
    config::parse_timeout(raw)
        .ok_or_else(|| format!("invalid timeout '{}', use a format like '5s', '30s', '2m'", raw))
}

/// Everything a spawned scan task needs.
#[derive(Clone)]
struct ScanContext {
    scanner: Scanner,
    output_dir: PathBuf,
    save_results: bool,
}

impl ScanContext {
    fn new(config: &ReconConfig) -> Self {
        Self {
            scanner: Scanner::new(config),
            output_dir: config.output_dir.clone(),
            save_results: config.save_results,
        }
    }

    async fn run(self, raw_input: String) -> ScanOutcome {
        match self.scanner.scan(&raw_input).await {
            Ok(result) => {
                let saved = if self.save_results {
                    Some(storage::persist(result.clone(), self.output_dir).await)
                } else {
                    None
                };
                ScanOutcome::Completed { result, saved }
            }
            Err(e) => ScanOutcome::Rejected(e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let log_path = logging::initialize_logging()?;

    let args = Args::parse();
    let config = args.apply(ReconConfig::from_env());
    info!(log = %log_path.display(), ?config, "Recon-lite starting.");

    let context = ScanContext::new(&config);
    match args.domain {
        Some(domain) => run_headless(context, domain).await,
        None => run_tui(context).await,
    }
}

/// One scan, JSON on stdout, saved paths after it.
async fn run_headless(context: ScanContext, domain: String) -> Result<()> {
    let result = context.scanner.scan(&domain).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if context.save_results {
        let report = storage::persist(result, context.output_dir).await;
        for path in &report.saved {
            println!("Results saved to {}", path.display());
        }
        for failure in &report.failures {
            eprintln!("{}", failure);
        }
    }
    Ok(())
}

async fn run_tui(context: ScanContext) -> Result<()> {
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut app = App::new();
    let outcome = event_loop(&mut terminal, &mut app, &context).await;

    // Restore the terminal even when the loop failed.
    app.cancel_scan();
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    context: &ScanContext,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(1);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key, context, &tx);
                }
            }
        }

        // Outcomes of a scan reset or replaced during this tick carry a stale id.
        if let Ok((id, outcome)) = rx.try_recv() {
            app.finish_scan(id, outcome);
        }
        app.on_tick();
    }
    Ok(())
}

fn handle_key(
    app: &mut App,
    key: KeyEvent,
    context: &ScanContext,
    tx: &mpsc::Sender<(ScanId, ScanOutcome)>,
) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if ctrl => app.quit(),
        KeyCode::Char('l') if ctrl => app.reset(),
        KeyCode::Char(c) => app.push_char(c),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Enter => start_scan(app, context, tx),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        _ => {}
    }
}

fn start_scan(app: &mut App, context: &ScanContext, tx: &mpsc::Sender<(ScanId, ScanOutcome)>) {
    let request = match app.begin_scan() {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Scan not started.");
            return;
        }
    };

    let context = context.clone();
    let tx = tx.clone();
    let handle = tokio::spawn(async move {
        let outcome = context.run(request.input).await;
        let _ = tx.send((request.id, outcome)).await;
    });
    app.attach_task(handle);
}
