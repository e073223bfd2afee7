// src/core/scanner/dns_scanner.rs

use std::net::IpAddr;
use std::time::Duration;

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use tokio::net::lookup_host;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::core::domain::Domain;
use crate::core::models::{DnsLookup, DnsRecordType, NOT_RESOLVED};

/// Address resolution and coarse record classification for one scan.
///
/// The classifier does not speak the DNS wire protocol for MX or NS. It runs a
/// general address-info lookup and labels each address with the requested
/// type, so those entries are addresses, not mail exchangers or name servers.
pub struct DnsScanner {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl DnsScanner {
    /// Builds a resolver from the system configuration, falling back to the
    /// library defaults if it cannot be read.
    ///
    /// # Arguments
    /// * `lookup_timeout` - Bound on each lookup. The resolver makes one attempt.
    pub fn new(lookup_timeout: Duration) -> Self {
        let (config, mut opts) = read_system_conf().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read system resolver configuration, using defaults.");
            (ResolverConfig::default(), ResolverOpts::default())
        });
        opts.timeout = lookup_timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout: lookup_timeout,
        }
    }

    /// Resolves a domain to its primary address using the system resolver
    /// configuration.
    ///
    /// Failure is an expected outcome here, not an error: NXDOMAIN, a timeout,
    /// a malformed name and an empty answer all yield the sentinel.
    ///
    /// # Arguments
    /// * `domain` - The normalized host to resolve.
    ///
    /// # Returns
    /// The first IPv4 address if there is one, otherwise the first address
    /// returned, as a string. `"Not resolved"` when nothing came back.
    pub async fn resolve_address(&self, domain: &Domain) -> String {
        debug!(target = %domain, "Resolving address.");

        match timeout(self.timeout, self.resolver.lookup_ip(domain.as_str())).await {
            Ok(Ok(lookup)) => {
                let addresses: Vec<IpAddr> = lookup.iter().collect();
                match primary_address(&addresses) {
                    Some(address) => {
                        info!(target = %domain, address = %address, "Address resolved.");
                        address.to_string()
                    }
                    None => {
                        debug!(target = %domain, "Lookup succeeded but returned no addresses.");
                        NOT_RESOLVED.to_string()
                    }
                }
            }
            Ok(Err(e)) => {
                warn!(target = %domain, error = %e, "Address lookup failed.");
                NOT_RESOLVED.to_string()
            }
            Err(_) => {
                warn!(target = %domain, timeout = ?self.timeout, "Address lookup timed out.");
                NOT_RESOLVED.to_string()
            }
        }
    }

    /// Builds the coarse record list for one record type.
    ///
    /// `A` wraps the resolver's answer. `MX` and `NS` run an address-info
    /// lookup and label each address with the type; they are not decoded
    /// resource records.
    ///
    /// # Arguments
    /// * `domain` - The normalized host to look up.
    /// * `record_type` - Which list to build.
    ///
    /// # Returns
    /// The entries in resolver order, each formatted as `"<address> (<type>)"`
    /// for MX and NS. Never empty: zero results give `["No records found"]`.
    pub async fn classify(&self, domain: &Domain, record_type: DnsRecordType) -> Vec<String> {
        let lookup = match record_type {
            DnsRecordType::A => DnsLookup::from_records(vec![self.resolve_address(domain).await]),
            DnsRecordType::Mx | DnsRecordType::Ns => self.address_info(domain, record_type).await,
        };

        if lookup == DnsLookup::Empty {
            debug!(target = %domain, %record_type, "No records found.");
        }
        lookup.into_records()
    }

    /// Runs `getaddrinfo` for the domain and labels each address.
    async fn address_info(&self, domain: &Domain, record_type: DnsRecordType) -> DnsLookup {
        match timeout(self.timeout, lookup_host((domain.as_str(), 0))).await {
            Ok(Ok(addrs)) => {
                let records: Vec<String> = addrs
                    .map(|addr| format_record(addr.ip(), record_type))
                    .collect();
                info!(target = %domain, %record_type, count = records.len(), "Address-info lookup finished.");
                DnsLookup::from_records(records)
            }
            Ok(Err(e)) => {
                debug!(target = %domain, %record_type, error = %e, "Address-info lookup failed.");
                DnsLookup::Empty
            }
            Err(_) => {
                warn!(target = %domain, %record_type, timeout = ?self.timeout, "Address-info lookup timed out.");
                DnsLookup::Empty
            }
        }
    }
}

fn primary_address(addresses: &[IpAddr]) -> Option<IpAddr> {
    addresses
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addresses.first())
        .copied()
}

fn format_record(address: IpAddr, record_type: DnsRecordType) -> String {
    format!("{} ({})", address, record_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::NO_RECORDS_FOUND;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn scanner() -> DnsScanner {
        DnsScanner::new(Duration::from_secs(3))
    }

    #[test]
    fn test_primary_address_prefers_ipv4() {
        let v6 = IpAddr::V6(Ipv6Addr::LOCALHOST);
        let v4 = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7));
        assert_eq!(primary_address(&[v6, v4]), Some(v4));
        assert_eq!(primary_address(&[v6]), Some(v6));
        assert_eq!(primary_address(&[]), None);
    }

    #[test]
    fn test_format_record() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
        assert_eq!(format_record(ip, DnsRecordType::Mx), "192.0.2.1 (MX)");
        assert_eq!(format_record(ip, DnsRecordType::Ns), "192.0.2.1 (NS)");
    }

    #[tokio::test]
    async fn test_unresolvable_name_is_not_resolved() {
        let domain = Domain::normalize("no-such-host.invalid");
        assert_eq!(scanner().resolve_address(&domain).await, NOT_RESOLVED);
    }

    #[tokio::test]
    async fn test_ip_literal_resolves_to_itself() {
        let domain = Domain::normalize("127.0.0.1");
        assert_eq!(scanner().resolve_address(&domain).await, "127.0.0.1");
    }

    #[tokio::test]
    async fn test_a_record_wraps_resolver_result() {
        let domain = Domain::normalize("no-such-host.invalid");
        assert_eq!(
            scanner().classify(&domain, DnsRecordType::A).await,
            vec![NOT_RESOLVED.to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_mx_and_ns_yield_sentinel() {
        let domain = Domain::normalize("no-such-host.invalid");
        let dns = scanner();
        for record_type in [DnsRecordType::Mx, DnsRecordType::Ns] {
            assert_eq!(
                dns.classify(&domain, record_type).await,
                vec![NO_RECORDS_FOUND.to_string()]
            );
        }
    }

    #[tokio::test]
    async fn test_address_info_labels_each_address() {
        let domain = Domain::normalize("127.0.0.1");
        let records = scanner().classify(&domain, DnsRecordType::Ns).await;
        assert_eq!(records, vec!["127.0.0.1 (NS)".to_string()]);
    }
}
