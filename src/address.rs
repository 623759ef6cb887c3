//! Syntactic parsing of an email address into its local and domain parts.
//!
//! This is deliberately minimal: RFC 5322 grammar checking, confusable-
//! character detection and IDNA policy enforcement are out of scope for
//! the core. Only the domain's ASCII form is computed here, because DNS
//! resolution needs it regardless.

use thiserror::Error;

/// A parsed `(local, domain)` pair. Both sides are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub local: String,
    pub domain: String,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AddressError {
    #[error("address must contain exactly one '@'")]
    MalformedAt,
    #[error("local part is empty")]
    EmptyLocal,
    #[error("domain is empty")]
    EmptyDomain,
}

impl Address {
    /// Parses `raw` per the minimal acceptance rule: exactly one `@`, both
    /// sides non-empty.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let trimmed = raw.trim();
        let mut parts = trimmed.split('@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next();
        if domain.is_none() || parts.next().is_some() {
            return Err(AddressError::MalformedAt);
        }
        let domain = domain.unwrap();
        if local.is_empty() {
            return Err(AddressError::EmptyLocal);
        }
        if domain.is_empty() {
            return Err(AddressError::EmptyDomain);
        }
        Ok(Self {
            local: local.to_string(),
            domain: domain.to_string(),
        })
    }

    /// The ASCII (punycode) form of the domain, used for DNS lookups and for
    /// the `RCPT TO` / `MAIL FROM` envelopes. Falls back to the raw domain
    /// when IDNA conversion fails — DNS resolution will then simply fail on
    /// an invalid label, which is the behavior §4.2 expects.
    pub fn ascii_domain(&self) -> String {
        idna::domain_to_ascii(&self.domain).unwrap_or_else(|_| self.domain.clone())
    }

    /// Reconstructs the `local@domain` envelope form.
    pub fn email(&self) -> String {
        format!("{}@{}", self.local, self.domain)
    }
}
