//! Orchestrates DNS resolution, connection, and the SMTP conversation into
//! a single verdict (§2, §4.5), always issuing the catch-all probe before
//! the target `RCPT TO`.

pub mod types;

use rand::Rng;

use crate::address::Address;
use crate::config::Config;
use crate::connection::{self, ProxyConfig};
use crate::dns;
use crate::smtp::{Classification, SmtpSession};

pub use types::{Verdict, VerdictDetails, VerdictStatus};

/// Runs the full pipeline for `raw_email` and returns a verdict. Never
/// panics: every layer's structured error is folded into an `UNKNOWN` or
/// `INVALID` verdict (§7 Propagation policy).
pub async fn verify(raw_email: &str, proxy: Option<&ProxyConfig>, config: &Config) -> Verdict {
    tracing::info!(target: "verifier", email = raw_email, "starting verification");

    let address = match Address::parse(raw_email) {
        Ok(a) => a,
        Err(_) => return Verdict::invalid("Invalid email syntax"),
    };

    let domain = address.ascii_domain();
    let (mx, tier) = match dns::resolve_mx(&domain, config).await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(target: "verifier", %domain, error = %e, "MX resolution failed");
            return Verdict::invalid("No MX records found");
        }
    };
    let target_host = mx.primary().exchange.clone();
    tracing::debug!(target: "verifier", %domain, host = %target_host, tier = tier.0, "MX resolved");

    let sender = format!("verify@{domain}");
    run_session(&target_host, &sender, &address, proxy, config).await
}

async fn run_session(
    host: &str,
    sender: &str,
    address: &Address,
    proxy: Option<&ProxyConfig>,
    config: &Config,
) -> Verdict {
    let (transport, _banner) = match connection::connect_to_smtp(host, config.smtp_port, proxy, config).await {
        Ok(ok) => ok,
        Err(e) => return Verdict::unknown(e.to_string()),
    };

    let mut session = SmtpSession::new(transport, config);

    if let Err(e) = session.hello(&config.default_helo, config).await {
        session.quit().await;
        return Verdict::unknown(e.to_string());
    }

    if let Err(e) = session.mail_from(sender, config).await {
        session.quit().await;
        return Verdict::unknown(e.to_string());
    }

    // Catch-all probe first (§5 Ordering guarantees): a prescient server
    // could otherwise memoize the target and bias the probe.
    let probe_recipient = format!("{}@{}", random_hex_local_part(12), address.domain);
    let probe = match session.rcpt_to(&probe_recipient, config).await {
        Ok(r) => r,
        Err(e) => {
            session.quit().await;
            return Verdict::unknown(e.to_string());
        }
    };

    let target = match session.rcpt_to(&address.email(), config).await {
        Ok(r) => r,
        Err(e) => {
            session.quit().await;
            return Verdict::unknown(e.to_string());
        }
    };

    session.quit().await;

    synthesize(&probe, &target)
}

/// A random 12-hex-character local part for the catch-all probe address
/// (§4.5 step 6): `verify-XXXXXXXXXXXX`.
fn random_hex_local_part(len: usize) -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    let mut rng = rand::thread_rng();
    let hex: String = (0..len).map(|_| HEX[rng.gen_range(0..HEX.len())] as char).collect();
    format!("verify-{hex}")
}

fn synthesize(probe: &crate::smtp::SmtpResponse, target: &crate::smtp::SmtpResponse) -> Verdict {
    let details = VerdictDetails {
        smtp_code: Some(target.code),
        smtp_message: Some(target.message.clone()),
        catch_all_active: probe.is_success(),
        greylisted: probe.is_transient_fail() || target.is_transient_fail(),
    };

    if probe.classification == Classification::TransientFail || target.classification == Classification::TransientFail
    {
        return Verdict {
            status: VerdictStatus::Unknown,
            reason: "Greylisted".to_string(),
            details,
        };
    }

    if target.is_permanent_fail() {
        return Verdict {
            status: VerdictStatus::Invalid,
            reason: "Recipient rejected".to_string(),
            details,
        };
    }

    if target.is_success() && probe.is_success() {
        return Verdict {
            status: VerdictStatus::CatchAll,
            reason: "Domain is Catch-All".to_string(),
            details,
        };
    }

    if target.is_success() {
        return Verdict {
            status: VerdictStatus::Valid,
            reason: "Recipient accepted".to_string(),
            details,
        };
    }

    Verdict {
        status: VerdictStatus::Unknown,
        reason: target.message.clone(),
        details,
    }
}
