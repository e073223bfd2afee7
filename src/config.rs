// src/config.rs

//! Runtime settings for the probes and the result files.
//!
//! Values start from `ReconConfig::default()`, are overridden by `RECON_*`
//! environment variables, and finally by command-line flags in `main`.

use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_WHOIS_SERVER: &str = "whois.iana.org";
pub const DEFAULT_WHOIS_PORT: u16 = 43;
pub const DEFAULT_USER_AGENT: &str = "Recon-lite/1.0";

#[derive(Debug, Clone, PartialEq)]
pub struct ReconConfig {
    /// Bound on each address lookup.
    pub dns_timeout: Duration,
    /// Bound on the whole WHOIS exchange (connect, send, receive).
    pub whois_timeout: Duration,
    /// Bound on each HTTP attempt.
    pub http_timeout: Duration,
    pub whois_server: String,
    pub whois_port: u16,
    pub user_agent: String,
    /// Directory the JSON and CSV files are written to.
    pub output_dir: PathBuf,
    pub save_results: bool,
    /// Honor `HTTP(S)_PROXY` for the HTTP probe.
    pub use_proxy: bool,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            dns_timeout: Duration::from_secs(5),
            whois_timeout: Duration::from_secs(10),
            http_timeout: Duration::from_secs(10),
            whois_server: DEFAULT_WHOIS_SERVER.to_string(),
            whois_port: DEFAULT_WHOIS_PORT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output_dir: PathBuf::from("."),
            save_results: true,
            use_proxy: true,
        }
    }
}

impl ReconConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().merge_env(|key| std::env::var(key).ok())
    }

    /// Applies `RECON_*` overrides read through `lookup`.
    ///
    /// Invalid values are logged and ignored.
    pub fn merge_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeouts = [
            ("RECON_DNS_TIMEOUT", &mut self.dns_timeout),
            ("RECON_WHOIS_TIMEOUT", &mut self.whois_timeout),
            ("RECON_HTTP_TIMEOUT", &mut self.http_timeout),
        ];
        for (key, slot) in timeouts {
            if let Some(raw) = lookup(key) {
                match parse_timeout(&raw) {
                    Some(timeout) => {
                        debug!(key, ?timeout, "Using timeout from environment.");
                        *slot = timeout;
                    }
                    None => warn!(key, value = %raw, "Invalid timeout, use a format like '5s', '30s', '2m'."),
                }
            }
        }

        if let Some(server) = non_empty(lookup("RECON_WHOIS_SERVER")) {
            debug!(server = %server, "Using WHOIS server from environment.");
            self.whois_server = server;
        }

        if let Some(raw) = lookup("RECON_WHOIS_PORT") {
            match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => self.whois_port = port,
                _ => warn!(value = %raw, "Invalid RECON_WHOIS_PORT, must be 1-65535."),
            }
        }

        if let Some(agent) = non_empty(lookup("RECON_USER_AGENT")) {
            self.user_agent = agent;
        }

        if let Some(dir) = non_empty(lookup("RECON_OUTPUT_DIR")) {
            self.output_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup("RECON_SAVE") {
            match parse_bool(&raw) {
                Some(save) => self.save_results = save,
                None => warn!(value = %raw, "Invalid RECON_SAVE, use true/false."),
            }
        }

        if let Some(raw) = lookup("RECON_NO_PROXY") {
            match parse_bool(&raw) {
                Some(no_proxy) => self.use_proxy = !no_proxy,
                None => warn!(value = %raw, "Invalid RECON_NO_PROXY, use true/false."),
            }
        }

        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a timeout like "5s", "30s", "2m" or a bare number of seconds.
/// Zero is rejected.
pub fn parse_timeout(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();

    let seconds = if let Some(secs) = value.strip_suffix('s') {
        secs.parse::<u64>().ok()
    } else if let Some(mins) = value.strip_suffix('m') {
        mins.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        value.parse::<u64>().ok()
    }?;

    (seconds > 0).then(|| Duration::from_secs(seconds))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout(" 30S "), Some(Duration::from_secs(30)));
        assert_eq!(parse_timeout("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout("7"), Some(Duration::from_secs(7)));
        assert_eq!(parse_timeout("0s"), None);
        assert_eq!(parse_timeout("soon"), None);
        assert_eq!(parse_timeout(""), None);
    }

    #[test]
    fn test_defaults() {
        let config = ReconConfig::default();
        assert_eq!(config.dns_timeout, Duration::from_secs(5));
        assert_eq!(config.whois_timeout, Duration::from_secs(10));
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.whois_server, "whois.iana.org");
        assert_eq!(config.whois_port, 43);
        assert_eq!(config.user_agent, "Recon-lite/1.0");
        assert!(config.save_results);
        assert!(config.use_proxy);
    }

    #[test]
    fn test_env_overrides() {
        let config = ReconConfig::default().merge_env(env_of(&[
            ("RECON_DNS_TIMEOUT", "2s"),
            ("RECON_HTTP_TIMEOUT", "1m"),
            ("RECON_WHOIS_SERVER", "whois.verisign-grs.com"),
            ("RECON_WHOIS_PORT", "4343"),
            ("RECON_OUTPUT_DIR", "/tmp/recon"),
            ("RECON_SAVE", "off"),
            ("RECON_NO_PROXY", "yes"),
        ]));

        assert_eq!(config.dns_timeout, Duration::from_secs(2));
        assert_eq!(config.http_timeout, Duration::from_secs(60));
        assert_eq!(config.whois_timeout, Duration::from_secs(10));
        assert_eq!(config.whois_server, "whois.verisign-grs.com");
        assert_eq!(config.whois_port, 4343);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/recon"));
        assert!(!config.save_results);
        assert!(!config.use_proxy);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let config = ReconConfig::default().merge_env(env_of(&[
            ("RECON_DNS_TIMEOUT", "fast"),
            ("RECON_WHOIS_PORT", "0"),
            ("RECON_WHOIS_SERVER", "   "),
            ("RECON_SAVE", "maybe"),
        ]));

        assert_eq!(config, ReconConfig::default());
    }
}
