// src/core/scanner/whois_scanner.rs

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ReconConfig;
use crate::core::domain::Domain;
use crate::core::models::{WhoisResult, timestamp_now};

/// Characters of decoded response kept in the preview.
const PREVIEW_CHARS: usize = 300;
/// Always appended to the preview, even when nothing was cut.
const PREVIEW_SUFFIX: &str = "...";

/// Minimal WHOIS client speaking the plain port-43 protocol.
///
/// One query per call: connect, send `<domain>\r\n`, read until the server
/// closes the connection. Referrals in the response are not followed.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    server: String,
    port: u16,
    timeout: Duration,
}

impl WhoisClient {
    pub fn new(server: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            server: server.into(),
            port,
            timeout,
        }
    }

    pub fn from_config(config: &ReconConfig) -> Self {
        Self::new(config.whois_server.clone(), config.whois_port, config.whois_timeout)
    }

    /// Queries the registry for a domain over the port-43 protocol.
    ///
    /// A single timeout covers connect, send and receive. Any failure yields
    /// the error variant; a partial response is never reported as a success.
    ///
    /// # Arguments
    /// * `domain` - The normalized domain sent as the query text.
    ///
    /// # Returns
    /// `WhoisResult::Success` with the preview of the response, the registry
    /// host and the capture time, or `WhoisResult::Error` with
    /// `"WHOIS failed: <cause>"`.
    pub async fn query(&self, domain: &Domain) -> WhoisResult {
        info!(target = %domain, server = %self.server, "Starting WHOIS query.");

        match timeout(self.timeout, self.exchange(domain.as_str())).await {
            Ok(Ok(response)) => {
                info!(target = %domain, bytes = response.len(), "WHOIS response received.");
                WhoisResult::Success {
                    domain: domain.to_string(),
                    whois_server: self.server.clone(),
                    response_preview: build_preview(&response),
                    checked_at: timestamp_now(),
                }
            }
            Ok(Err(e)) => {
                warn!(target = %domain, server = %self.server, error = %e, "WHOIS query failed.");
                WhoisResult::failed(e)
            }
            Err(_) => {
                warn!(target = %domain, server = %self.server, timeout = ?self.timeout, "WHOIS query timed out.");
                WhoisResult::failed(format!("timed out after {:?}", self.timeout))
            }
        }
    }

    async fn exchange(&self, query: &str) -> std::io::Result<Vec<u8>> {
        debug!(server = %self.server, port = self.port, "Connecting to WHOIS server.");
        let mut stream = TcpStream::connect((self.server.as_str(), self.port)).await?;

        stream.write_all(format!("{}\r\n", query).as_bytes()).await?;

        // WHOIS has no framing: the response ends when the server hangs up.
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await?;
        Ok(response)
    }
}

/// Decodes the raw response lossily and keeps the first 300 characters,
/// followed by "...".
///
/// # Arguments
/// * `raw` - Every byte received before the server closed the connection.
///
/// # Returns
/// At most 303 characters. The ellipsis is appended even when nothing was cut.
pub fn build_preview(raw: &[u8]) -> String {
    let decoded = String::from_utf8_lossy(raw);
    let mut preview: String = decoded.chars().take(PREVIEW_CHARS).collect();
    preview.push_str(PREVIEW_SUFFIX);
    preview
}
