// src/core/models.rs

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::{Display, EnumIter};

use crate::core::domain::Domain;

// --- Sentinels ---

/// Stored as the address (and as the only A record) when resolution fails.
pub const NOT_RESOLVED: &str = "Not resolved";
/// The single entry of a record list whose lookup produced nothing.
pub const NO_RECORDS_FOUND: &str = "No records found";
/// Error message when neither HTTPS nor HTTP could be reached.
pub const CONNECTION_FAILED: &str = "Connection failed";

/// Layout used for every timestamp in the report, at second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time, truncated to whole seconds.
pub fn timestamp_now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

/// Serde adapter writing `NaiveDateTime` in `TIMESTAMP_FORMAT`.
mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

// --- DNS Models ---

/// The record categories the classifier reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    A,
    Mx,
    Ns,
}

/// Outcome of one classifier lookup.
///
/// `Empty` covers both "the lookup failed" and "the lookup returned nothing";
/// the report does not distinguish the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsLookup {
    Found(Vec<String>),
    Empty,
}

impl DnsLookup {
    pub fn from_records(records: Vec<String>) -> Self {
        if records.is_empty() {
            Self::Empty
        } else {
            Self::Found(records)
        }
    }

    /// Converts the outcome into the list stored in the report.
    /// Never returns an empty list.
    pub fn into_records(self) -> Vec<String> {
        match self {
            Self::Found(records) => records,
            Self::Empty => vec![NO_RECORDS_FOUND.to_string()],
        }
    }
}

// --- WHOIS Models ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WhoisResult {
    Success {
        domain: String,
        whois_server: String,
        response_preview: String,
        #[serde(with = "timestamp_format")]
        checked_at: NaiveDateTime,
    },
    Error {
        #[serde(rename = "error")]
        message: String,
    },
}

impl WhoisResult {
    /// Builds the error variant, prefixing the cause with "WHOIS failed: ".
    pub fn failed(cause: impl fmt::Display) -> Self {
        Self::Error {
            message: format!("WHOIS failed: {}", cause),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Field names and stringified values, in declaration order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Success {
                domain,
                whois_server,
                response_preview,
                checked_at,
            } => vec![
                ("domain", domain.clone()),
                ("whois_server", whois_server.clone()),
                ("response_preview", response_preview.clone()),
                ("checked_at", checked_at.format(TIMESTAMP_FORMAT).to_string()),
            ],
            Self::Error { message } => vec![("error", message.clone())],
        }
    }
}

// --- HTTP Models ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HttpResult {
    Success {
        headers: BTreeMap<String, String>,
        status_code: u16,
        final_url: String,
    },
    Error {
        #[serde(rename = "error")]
        message: String,
    },
}

impl HttpResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

// --- Main Report ---

/// Everything one scan learned about a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub domain: Domain,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub ip_address: String,
    pub a_records: Vec<String>,
    pub mx_records: Vec<String>,
    pub ns_records: Vec<String>,
    pub whois: WhoisResult,
    pub http_headers: HttpResult,
}

impl ScanResult {
    pub fn records(&self, record_type: DnsRecordType) -> &[String] {
        match record_type {
            DnsRecordType::A => &self.a_records,
            DnsRecordType::Mx => &self.mx_records,
            DnsRecordType::Ns => &self.ns_records,
        }
    }
}
