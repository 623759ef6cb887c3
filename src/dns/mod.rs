//! DNS MX resolution with tiered failover (§2, §4.2).

pub mod error;
pub mod resolver;
pub mod types;

pub use error::DnsError;
pub use resolver::{resolve_mx, validate_domain};
pub use types::{MxRecord, MxStatus, TierIndex};
