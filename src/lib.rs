//! Checks whether an email address is deliverable without sending mail:
//! resolves MX records, opens a controlled SMTP conversation (optionally
//! through a SOCKS5 proxy), probes for a catch-all domain, and classifies
//! the result.

pub mod address;
pub mod config;
pub mod connection;
pub mod dns;
pub mod mapper;
pub mod smtp;
pub mod verifier;

pub use address::{Address, AddressError};
pub use config::Config;
pub use mapper::{to_public_result, PublicResult};
pub use verifier::{verify, Verdict, VerdictStatus};
