// src/core/domain.rs

use serde::{Deserialize, Serialize};
use std::fmt;

const SCHEME_PREFIXES: [&str; 2] = ["http://", "https://"];
const WWW_PREFIX: &str = "www.";

/// A host name as the probes see it: lowercase, no scheme, no leading "www.".
///
/// Normalization never validates the host. A malformed name is passed on to
/// the probes, which are expected to fail gracefully on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    /// Normalizes raw user input into a `Domain`.
    ///
    /// Steps, in order: trim and lowercase, strip one "http://" or "https://"
    /// prefix, then strip one leading "www." label. The result may be empty.
    pub fn normalize(input: &str) -> Self {
        let lowered = input.trim().to_lowercase();

        let without_scheme = SCHEME_PREFIXES
            .iter()
            .find_map(|scheme| lowered.strip_prefix(scheme))
            .unwrap_or(&lowered);

        let host = without_scheme
            .strip_prefix(WWW_PREFIX)
            .unwrap_or(without_scheme);

        Self(host.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scheme_and_www_case_insensitively() {
        assert_eq!(Domain::normalize("HTTP://WWW.Example.COM").as_str(), "example.com");
        assert_eq!(Domain::normalize("https://www.example.com").as_str(), "example.com");
        assert_eq!(Domain::normalize("http://example.com").as_str(), "example.com");
        assert_eq!(Domain::normalize("www.example.com").as_str(), "example.com");
    }

    #[test]
    fn test_trims_before_stripping() {
        assert_eq!(Domain::normalize("  https://Example.org \n").as_str(), "example.org");
    }

    #[test]
    fn test_strips_only_one_scheme_and_one_www() {
        assert_eq!(
            Domain::normalize("https://http://example.com").as_str(),
            "http://example.com"
        );
        assert_eq!(Domain::normalize("www.www.example.com").as_str(), "www.example.com");
    }

    #[test]
    fn test_leaves_inner_labels_and_paths_alone() {
        assert_eq!(Domain::normalize("api.www.example.com").as_str(), "api.www.example.com");
        assert_eq!(Domain::normalize("example.com/path").as_str(), "example.com/path");
        assert_eq!(Domain::normalize("ftp://example.com").as_str(), "ftp://example.com");
    }

    #[test]
    fn test_normalizing_is_idempotent_on_normalized_domains() {
        for raw in ["example.com", "sub.example.co.uk", "127.0.0.1:8080", "xn--bcher-kva.example"] {
            let once = Domain::normalize(raw);
            let twice = Domain::normalize(once.as_str());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_may_produce_empty_domain() {
        assert!(Domain::normalize("").is_empty());
        assert!(Domain::normalize("   ").is_empty());
        assert!(Domain::normalize("https://").is_empty());
        assert!(Domain::normalize("https://www.").is_empty());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let domain = Domain::normalize("Example.com");
        assert_eq!(serde_json::to_string(&domain).unwrap(), "\"example.com\"");
    }
}
