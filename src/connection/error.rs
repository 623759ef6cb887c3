use thiserror::Error;

use super::types::SocksPhase;

/// Connection-layer error taxonomy (§7, Connection kinds).
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("proxy authentication failed")]
    ProxyAuthFailed,
    #[error("proxy handshake timed out")]
    ProxyHandshakeTimeout,
    #[error("proxy could not reach the target: {0}")]
    ProxyConnectionFailed(String),
    #[error("SMTP banner not received within timeout")]
    SmtpBannerTimeout,
    #[error("SMTP banner did not start with 220: {0:?}")]
    SmtpBannerInvalid(String),
    #[error("could not connect to SMTP host: {0}")]
    SmtpConnectionFailed(String),
    #[error("socket error: {0}")]
    SmtpSocketError(#[from] std::io::Error),
    #[error("socket operation timed out")]
    SocketTimeout,
}

impl ConnectionError {
    /// Attributes a SOCKS5 reply code to a phase and whether the overall
    /// failure should surface as a proxy- or target-side error (§4.3
    /// SOCKS5 error attribution table).
    pub fn from_socks_reply(code: u8, message: impl Into<String>) -> Self {
        let message = message.into();
        let phase = match code {
            0x01 | 0x02 | 0x07 | 0x08 | 0xFF => SocksPhase::Proxy,
            0x03 | 0x04 | 0x05 | 0x06 => SocksPhase::Target,
            _ => SocksPhase::Proxy,
        };
        match phase {
            SocksPhase::Proxy => ConnectionError::ProxyAuthFailed,
            SocksPhase::Target => ConnectionError::SmtpConnectionFailed(message),
        }
    }
}
