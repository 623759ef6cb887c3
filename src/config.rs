//! Frozen configuration shared across the verification pipeline (§6).
//!
//! Modeled as an immutable value passed explicitly down the call chain,
//! rather than a process-wide singleton.

use std::net::SocketAddr;
use std::time::Duration;

/// One ordered list of name servers tried together before failing over to
/// the next tier.
#[derive(Debug, Clone)]
pub struct DnsTier {
    pub name: &'static str,
    pub servers: Vec<SocketAddr>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub dns_lookup_timeout: Duration,
    pub dns_retries: u32,
    pub tcp_connect_timeout: Duration,
    pub proxy_handshake_timeout: Duration,
    pub smtp_banner_timeout: Duration,
    pub smtp_command_timeout: Duration,
    pub connection_lifetime_ceiling: Duration,
    pub graceful_close_timeout: Duration,
    pub smtp_port: u16,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub default_helo: String,
    pub dns_tiers: Vec<DnsTier>,
    pub bulk_concurrency: usize,
    pub bulk_concurrency_ceiling: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dns_lookup_timeout: Duration::from_millis(5_000),
            dns_retries: 2,
            tcp_connect_timeout: Duration::from_millis(5_000),
            proxy_handshake_timeout: Duration::from_millis(10_000),
            smtp_banner_timeout: Duration::from_millis(5_000),
            smtp_command_timeout: Duration::from_millis(5_000),
            connection_lifetime_ceiling: Duration::from_millis(30_000),
            graceful_close_timeout: Duration::from_millis(1_000),
            smtp_port: 25,
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(800),
            default_helo: "verify.example.com".to_string(),
            dns_tiers: default_dns_tiers(),
            bulk_concurrency: 20,
            bulk_concurrency_ceiling: 50,
        }
    }
}

impl Config {
    /// Per-command jitter band, narrowed for a specific stage (§4.4).
    pub fn jitter_for(&self, stage: JitterStage) -> (Duration, Duration) {
        match stage {
            JitterStage::Ehlo => (Duration::from_millis(100), Duration::from_millis(500)),
            JitterStage::HeloFallback => (Duration::from_millis(200), Duration::from_millis(400)),
            JitterStage::MailFrom => (Duration::from_millis(150), Duration::from_millis(800)),
            JitterStage::RcptTo => (Duration::from_millis(100), Duration::from_millis(600)),
        }
    }

    /// Clamps a requested bulk concurrency to the configured ceiling.
    pub fn clamp_concurrency(&self, requested: usize) -> usize {
        requested.clamp(1, self.bulk_concurrency_ceiling)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum JitterStage {
    Ehlo,
    HeloFallback,
    MailFrom,
    RcptTo,
}

fn default_dns_tiers() -> Vec<DnsTier> {
    vec![
        DnsTier {
            name: "primary",
            servers: vec!["1.1.1.1:53".parse().unwrap()],
        },
        DnsTier {
            name: "fallback",
            servers: vec!["8.8.8.8:53".parse().unwrap()],
        },
        DnsTier {
            name: "secondary",
            servers: vec!["9.9.9.9:53".parse().unwrap()],
        },
    ]
}
