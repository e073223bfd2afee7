// src/storage.rs

//! Writes finished scans to disk.
//!
//! Two files per scan: `<domain>_recon.json` with the whole report, and
//! `<domain>_whois.csv` with the WHOIS portion flattened to one row.
//! Failures are logged and returned to the caller; they never affect the scan.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info};

use crate::core::domain::Domain;
use crate::core::models::{ScanResult, WhoisResult};

/// Longest value, in characters, written to a CSV cell.
const CSV_CELL_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not create output directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("JSON save failed for {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("CSV save failed for {path}: {source}")]
    Csv { path: PathBuf, source: io::Error },
}

/// Paths written and errors met while saving one scan.
#[derive(Debug, Default)]
pub struct SaveReport {
    pub saved: Vec<PathBuf>,
    pub failures: Vec<String>,
}

/// File-name-safe form of a domain: anything outside `[a-z0-9.-]` becomes `_`.
pub fn file_stem(domain: &Domain) -> String {
    domain
        .as_str()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '.' | '-' => c,
            _ => '_',
        })
        .collect()
}

fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|source| StorageError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Writes the full report as pretty-printed JSON.
pub fn save_json(result: &ScanResult, dir: &Path) -> Result<PathBuf, StorageError> {
    ensure_dir(dir)?;
    let path = dir.join(format!("{}_recon.json", file_stem(&result.domain)));

    let write = || -> Result<(), serde_json::Error> {
        let file = File::create(&path).map_err(serde_json::Error::io)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, result)?;
        writer.flush().map_err(serde_json::Error::io)
    };
    write().map_err(|source| StorageError::Json {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// Writes the WHOIS result as a header row plus one data row.
pub fn save_whois_csv(
    domain: &Domain,
    whois: &WhoisResult,
    dir: &Path,
) -> Result<PathBuf, StorageError> {
    ensure_dir(dir)?;
    let path = dir.join(format!("{}_whois.csv", file_stem(domain)));

    fs::write(&path, render_whois_csv(whois)).map_err(|source| StorageError::Csv {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// Renders the CSV text: field names, then values truncated to 100 characters.
pub fn render_whois_csv(whois: &WhoisResult) -> String {
    let fields = whois.fields();

    let header: Vec<String> = fields.iter().map(|(name, _)| csv_cell(name)).collect();
    let row: Vec<String> = fields
        .iter()
        .map(|(_, value)| csv_cell(&truncate_chars(value, CSV_CELL_LIMIT)))
        .collect();

    format!("{}\r\n{}\r\n", header.join(","), row.join(","))
}

fn truncate_chars(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

/// Quotes a cell when it holds a separator, quote or line break.
fn csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Saves both files, logging and collecting any failure.
pub fn save_all(result: &ScanResult, dir: &Path) -> SaveReport {
    let mut report = SaveReport::default();

    let outcomes = [
        save_json(result, dir),
        save_whois_csv(&result.domain, &result.whois, dir),
    ];
    for outcome in outcomes {
        match outcome {
            Ok(path) => {
                info!(path = %path.display(), "Results saved.");
                report.saved.push(path);
            }
            Err(e) => {
                error!(error = %e, "Failed to save results.");
                report.failures.push(e.to_string());
            }
        }
    }

    report
}

/// `save_all` on the blocking pool, for callers on the async runtime.
pub async fn persist(result: ScanResult, dir: PathBuf) -> SaveReport {
    tokio::task::spawn_blocking(move || save_all(&result, &dir))
        .await
        .unwrap_or_else(|e| {
            error!(panic = %e, "Save task panicked!");
            SaveReport {
                saved: Vec::new(),
                failures: vec![format!("Save task panicked: {}", e)],
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{
        CONNECTION_FAILED, DnsLookup, HttpResult, NOT_RESOLVED, TIMESTAMP_FORMAT,
    };
    use chrono::NaiveDateTime;
    use tempfile::tempdir;

    fn sample_result(whois: WhoisResult) -> ScanResult {
        ScanResult {
            domain: Domain::normalize("example.com"),
            timestamp: NaiveDateTime::parse_from_str("2024-05-01 10:20:30", TIMESTAMP_FORMAT)
                .unwrap(),
            ip_address: NOT_RESOLVED.to_string(),
            a_records: vec![NOT_RESOLVED.to_string()],
            mx_records: DnsLookup::Empty.into_records(),
            ns_records: DnsLookup::Empty.into_records(),
            whois,
            http_headers: HttpResult::failed(CONNECTION_FAILED),
        }
    }

    fn whois_success(preview: &str) -> WhoisResult {
        WhoisResult::Success {
            domain: "example.com".to_string(),
            whois_server: "whois.iana.org".to_string(),
            response_preview: preview.to_string(),
            checked_at: NaiveDateTime::parse_from_str("2024-05-01 10:20:31", TIMESTAMP_FORMAT)
                .unwrap(),
        }
    }

    #[test]
    fn test_file_stem_replaces_unsafe_characters() {
        assert_eq!(file_stem(&Domain::normalize("example.com")), "example.com");
        assert_eq!(file_stem(&Domain::normalize("example.com/a b")), "example.com_a_b");
        assert_eq!(file_stem(&Domain::normalize("127.0.0.1:8080")), "127.0.0.1_8080");
    }

    #[test]
    fn test_csv_truncates_and_quotes() {
        let preview = format!("line one, with comma\n\"quoted\" {}", "z".repeat(200));
        let csv = render_whois_csv(&whois_success(&preview));
        let (header, row) = csv.split_once("\r\n").unwrap();

        assert_eq!(header, "domain,whois_server,response_preview,checked_at");
        assert!(row.starts_with("example.com,whois.iana.org,\"line one, with comma\n\"\"quoted\"\" z"));
        assert!(row.ends_with(",2024-05-01 10:20:31\r\n"));

        let expected_cell: String = preview.chars().take(100).collect();
        assert!(row.contains(&expected_cell.replace('"', "\"\"")));
        assert!(!row.contains(&"z".repeat(100)));
    }

    #[test]
    fn test_csv_for_whois_error() {
        let csv = render_whois_csv(&WhoisResult::failed("timed out"));
        assert_eq!(csv, "error\r\nWHOIS failed: timed out\r\n");
    }

    #[test]
    fn test_save_all_writes_both_files() {
        let dir = tempdir().unwrap();
        let result = sample_result(whois_success("% IANA WHOIS server..."));

        let report = save_all(&result, dir.path());
        assert!(report.failures.is_empty());
        assert_eq!(
            report.saved,
            vec![
                dir.path().join("example.com_recon.json"),
                dir.path().join("example.com_whois.csv"),
            ]
        );

        let json = fs::read_to_string(dir.path().join("example.com_recon.json")).unwrap();
        let parsed: ScanResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);

        let csv = fs::read_to_string(dir.path().join("example.com_whois.csv")).unwrap();
        assert!(csv.starts_with("domain,whois_server,response_preview,checked_at\r\n"));
    }

    #[test]
    fn test_save_all_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("results").join("today");

        let report = save_all(&sample_result(WhoisResult::failed("refused")), &nested);
        assert!(report.failures.is_empty());
        assert!(nested.join("example.com_whois.csv").exists());
    }

    #[test]
    fn test_save_all_reports_failures_without_panicking() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "occupied").unwrap();

        let report = save_all(&sample_result(WhoisResult::failed("refused")), &blocker);
        assert!(report.saved.is_empty());
        assert_eq!(report.failures.len(), 2);
    }
}
