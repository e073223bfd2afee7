// src/core/scanner/mod.rs

pub mod dns_scanner;
pub mod headers_scanner;
pub mod whois_scanner;

use std::time::Duration;
use tracing::{info, warn};

use self::dns_scanner::DnsScanner;
use self::headers_scanner::HttpProbe;
use self::whois_scanner::WhoisClient;
use crate::config::ReconConfig;
use crate::core::domain::Domain;
use crate::core::error::ScanError;
use crate::core::models::{DnsRecordType, ScanResult, timestamp_now};

/// Runs every probe against one domain and assembles the report.
///
/// A `Scanner` holds only settings. Each call to `scan` builds its own
/// resolver, sockets and HTTP client, so nothing is shared between scans
/// and clones can run concurrently.
#[derive(Debug, Clone)]
pub struct Scanner {
    dns_timeout: Duration,
    whois: WhoisClient,
    http: HttpProbe,
}

impl Scanner {
    pub fn new(config: &ReconConfig) -> Self {
        Self {
            dns_timeout: config.dns_timeout,
            whois: WhoisClient::from_config(config),
            http: HttpProbe::from_config(config),
        }
    }

    /// Validates and normalizes raw user input, then scans it.
    ///
    /// Rejects empty input before any network activity. Once the probes
    /// start, the scan always produces a complete `ScanResult`.
    ///
    /// # Arguments
    /// * `raw_input` - A domain or URL as typed, e.g. `"https://www.Example.com"`.
    ///
    /// # Returns
    /// The assembled `ScanResult`, or `ScanError::EmptyDomain` when the input
    /// is blank or normalizes to nothing.
    pub async fn scan(&self, raw_input: &str) -> Result<ScanResult, ScanError> {
        if raw_input.trim().is_empty() {
            return Err(ScanError::EmptyDomain);
        }

        let domain = Domain::normalize(raw_input);
        if domain.is_empty() {
            warn!(input = raw_input, "Input normalized to an empty domain.");
            return Err(ScanError::EmptyDomain);
        }

        Ok(self.scan_domain(domain).await)
    }

    /// Runs all probes concurrently against an already normalized domain.
    pub async fn scan_domain(&self, domain: Domain) -> ScanResult {
        info!(target = %domain, "Starting full scan.");
        let timestamp = timestamp_now();
        let dns = DnsScanner::new(self.dns_timeout);

        // The probes are independent; join waits for all of them.
        let (ip_address, a_records, mx_records, ns_records, whois, http_headers) = tokio::join!(
            dns.resolve_address(&domain),
            dns.classify(&domain, DnsRecordType::A),
            dns.classify(&domain, DnsRecordType::Mx),
            dns.classify(&domain, DnsRecordType::Ns),
            self.whois.query(&domain),
            self.http.probe(&domain),
        );

        info!(
            target = %domain,
            whois_ok = whois.is_success(),
            http_ok = http_headers.is_success(),
            "Full scan finished."
        );

        ScanResult {
            domain,
            timestamp,
            ip_address,
            a_records,
            mx_records,
            ns_records,
            whois,
            http_headers,
        }
    }
}
