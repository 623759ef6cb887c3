use thiserror::Error;

/// DNS error taxonomy (§4.2). Ordering matters for the retry policy: the
/// first three are hard fails that short-circuit retry and tier failover.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DnsError {
    #[error("domain does not satisfy basic label syntax")]
    InvalidDomain,
    #[error("domain does not exist")]
    HardFail,
    #[error("domain has no MX records")]
    NoMxRecords,
    #[error("resolver timed out")]
    Timeout,
    #[error("resolver returned a transient failure: {0}")]
    SoftFail(String),
}

impl DnsError {
    /// Hard fails and `NO_MX_RECORDS` terminate retry immediately and
    /// short-circuit all remaining tiers (§4.2 Retry policy / Tier
    /// failover).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DnsError::InvalidDomain | DnsError::HardFail | DnsError::NoMxRecords
        )
    }
}
