//! Multi-tier async MX resolution (§4.2).
//!
//! Tries the configured primary / fallback / secondary tiers in order,
//! each backed by its own `trust-dns-resolver` instance pointed at the
//! tier's name servers, with per-attempt timeouts and exponential backoff
//! on soft failures.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tokio::time::{sleep, timeout};
use trust_dns_resolver::config::{NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::TokioAsyncResolver;

use crate::config::{Config, DnsTier};

use super::error::DnsError;
use super::types::{MxRecord, MxStatus, TierIndex};

fn domain_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
            .unwrap()
    })
}

/// Basic label syntax check (§4.2 Domain validation): labels of 1-63 LDH
/// characters, at least one dot, at most 253 characters total.
pub fn validate_domain(ascii_domain: &str) -> Result<(), DnsError> {
    if ascii_domain.is_empty() || ascii_domain.len() > 253 {
        return Err(DnsError::InvalidDomain);
    }
    if !domain_regex().is_match(ascii_domain) {
        return Err(DnsError::InvalidDomain);
    }
    Ok(())
}

/// Resolves MX records for `domain`, trying each configured tier in order
/// (§4.2 Tier failover) and returns which tier answered alongside the
/// records, for instrumentation (§8 scenario 9).
pub async fn resolve_mx(
    domain: &str,
    config: &Config,
) -> Result<(MxStatus, TierIndex), DnsError> {
    let ascii = idna::domain_to_ascii(domain).map_err(|_| DnsError::InvalidDomain)?;
    validate_domain(&ascii)?;

    let mut last_err = DnsError::NoMxRecords;
    for (idx, tier) in config.dns_tiers.iter().enumerate() {
        match resolve_tier(&ascii, tier, config).await {
            Ok(records) => {
                tracing::debug!(target: "dns", domain = %ascii, tier = tier.name, tier_index = idx, "MX lookup succeeded");
                return Ok((MxStatus::new(records), TierIndex(idx)));
            }
            Err(err) if err.is_terminal() => {
                tracing::warn!(target: "dns", domain = %ascii, tier = tier.name, error = %err, "terminal DNS failure, no further tiers tried");
                return Err(err);
            }
            Err(err) => {
                tracing::debug!(target: "dns", domain = %ascii, tier = tier.name, error = %err, "tier exhausted, failing over");
                last_err = err;
            }
        }
    }
    Err(last_err)
}

async fn resolve_tier(ascii_domain: &str, tier: &DnsTier, config: &Config) -> Result<Vec<MxRecord>, DnsError> {
    let resolver = build_resolver(tier)?;
    let attempts = config.dns_retries + 1;

    let mut last_err = DnsError::SoftFail("no attempts made".to_string());
    for attempt in 1..=attempts {
        match timeout(config.dns_lookup_timeout, resolver.mx_lookup(ascii_domain)).await {
            Ok(Ok(lookup)) => {
                let records: Vec<MxRecord> = lookup
                    .iter()
                    .map(|mx| {
                        MxRecord::new(
                            mx.preference(),
                            mx.exchange().to_utf8().trim_end_matches('.').to_ascii_lowercase(),
                        )
                    })
                    .collect();
                if records.is_empty() {
                    return Err(DnsError::NoMxRecords);
                }
                return Ok(records);
            }
            Ok(Err(resolve_err)) => {
                let classified = classify(&resolve_err);
                if classified.is_terminal() {
                    return Err(classified);
                }
                last_err = classified;
            }
            Err(_elapsed) => {
                // A timer expiry is always TIMEOUT-class, regardless of the
                // underlying resolver state (§4.2 Query timeout).
                last_err = DnsError::Timeout;
            }
        }
        tracing::debug!(target: "dns", domain = %ascii_domain, tier = tier.name, attempt, error = %last_err, "MX lookup attempt failed");

        if attempt < attempts {
            let backoff_ms = 500u64 * 2u64.pow((attempt - 1) as u32);
            sleep(Duration::from_millis(backoff_ms)).await;
        }
    }
    Err(last_err)
}

fn build_resolver(tier: &DnsTier) -> Result<TokioAsyncResolver, DnsError> {
    let mut group = NameServerConfigGroup::new();
    for addr in &tier.servers {
        group.push(NameServerConfig {
            socket_addr: *addr,
            protocol: Protocol::Udp,
            tls_dns_name: None,
            trust_negative_responses: true,
            bind_addr: None,
        });
    }
    let resolver_config = ResolverConfig::from_parts(None, vec![], group);
    TokioAsyncResolver::tokio(resolver_config, ResolverOpts::default())
        .map_err(|e| DnsError::SoftFail(e.to_string()))
}

/// Maps the resolver's error signals onto the error taxonomy (§4.2 Error
/// taxonomy): NXDOMAIN-like to `HARD_FAIL`, timeouts to `TIMEOUT`,
/// SERVFAIL/connection-refused to `SOFT_FAIL`, an empty answer to
/// `NO_MX_RECORDS`, anything else defaults to `SOFT_FAIL`.
fn classify(err: &ResolveError) -> DnsError {
    match err.kind() {
        ResolveErrorKind::Timeout => DnsError::Timeout,
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            use trust_dns_resolver::proto::op::ResponseCode;
            match *response_code {
                ResponseCode::NXDomain => DnsError::HardFail,
                ResponseCode::ServFail => DnsError::SoftFail("SERVFAIL".to_string()),
                ResponseCode::NoError => DnsError::NoMxRecords,
                other => DnsError::SoftFail(format!("{other}")),
            }
        }
        other => DnsError::SoftFail(other.to_string()),
    }
}
