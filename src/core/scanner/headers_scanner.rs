// src/core/scanner/headers_scanner.rs

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::ReconConfig;
use crate::core::domain::Domain;
use crate::core::models::{CONNECTION_FAILED, HttpResult};

/// Schemes tried in order; the first one that answers wins.
const SCHEMES: [&str; 2] = ["https", "http"];

/// Fetches the response headers of `<scheme>://<domain>`.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    user_agent: String,
    timeout: Duration,
    use_system_proxy: bool,
    accept_invalid_certs: bool,
}

impl HttpProbe {
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.into(),
            timeout,
            use_system_proxy: true,
            accept_invalid_certs: false,
        }
    }

    pub fn from_config(config: &ReconConfig) -> Self {
        let probe = Self::new(config.user_agent.clone(), config.http_timeout);
        if config.use_proxy {
            probe
        } else {
            probe.without_proxy()
        }
    }

    /// Ignores proxy settings from the environment.
    pub fn without_proxy(mut self) -> Self {
        self.use_system_proxy = false;
        self
    }

    /// Skips certificate verification, so self-signed loopback servers answer.
    #[cfg(test)]
    pub(crate) fn accepting_invalid_certs(mut self) -> Self {
        self.accept_invalid_certs = true;
        self
    }

    /// Fetches the response headers of the domain, trying HTTPS first and then HTTP.
    ///
    /// Each attempt is a GET carrying the configured user agent and bounded by
    /// the configured timeout. Only connection-level failures (refused, reset,
    /// TLS handshake, timeout, redirect loop) move on to the next scheme. Any
    /// response, whatever its status, is final, so a working HTTPS endpoint is
    /// never superseded by HTTP. Every other failure, such as a reply that is
    /// not HTTP at all, ends the probe with its own message.
    ///
    /// # Arguments
    /// * `domain` - The normalized host to probe. It may carry a `:port`.
    ///
    /// # Returns
    /// `HttpResult::Success` with the headers (names in canonical form), the
    /// status code and the `scheme://domain` that answered. Otherwise
    /// `HttpResult::Error`, with "Connection failed" when neither scheme
    /// could be reached.
    pub async fn probe(&self, domain: &Domain) -> HttpResult {
        info!(target = %domain, "Starting HTTP probe.");

        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout);
        if !self.use_system_proxy {
            builder = builder.no_proxy();
        }
        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = match builder.build() {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "Failed to build HTTP client.");
                return HttpResult::failed(e.to_string());
            }
        };

        for scheme in SCHEMES {
            let target = format!("{}://{}", scheme, domain);
            let url = match Url::parse(&target) {
                Ok(url) => url,
                Err(e) => {
                    warn!(url = %target, error = %e, "Target is not a valid URL.");
                    return HttpResult::failed(e.to_string());
                }
            };

            debug!(url = %target, "Sending GET request.");
            match client.get(url).send().await {
                Ok(response) => {
                    let status_code = response.status().as_u16();
                    info!(url = %target, status = status_code, "Received HTTP response.");
                    return HttpResult::Success {
                        headers: collect_headers(response.headers()),
                        status_code,
                        final_url: target,
                    };
                }
                Err(e) if is_connection_failure(&e) => {
                    warn!(url = %target, error = %e, "Connection failed, trying next scheme.");
                }
                Err(e) => {
                    error!(url = %target, error = ?e, "HTTP request failed.");
                    return HttpResult::failed(error_message(&e));
                }
            }
        }

        warn!(target = %domain, "No scheme answered.");
        HttpResult::failed(CONNECTION_FAILED)
    }
}

/// Refused, reset or TLS failures surface as connect errors; the rest of
/// the connection class is timeouts and redirect loops. `is_request` is not
/// used: it also covers malformed responses.
fn is_connection_failure(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout() || e.is_redirect()
}

/// The error and its causes, e.g. "error sending request: invalid HTTP version parsed".
fn error_message(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Flattens the header map; for repeated names the last value wins.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                canonical_header_name(name.as_str()),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// `x-custom-header` becomes `X-Custom-Header`.
///
/// The HTTP stack lowercases names on parse, so the wire spelling is gone by
/// the time headers reach us. Title-Case is what servers send in practice.
fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
