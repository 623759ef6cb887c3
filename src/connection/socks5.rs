//! The SOCKS5 connection path (§4.3 SOCKS5 path), built around
//! `fast_socks5`'s `Socks5Stream` client.

use fast_socks5::client::{Config as Socks5Config, Socks5Stream};
use fast_socks5::ReplyError;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::Config;

use super::banner::read_banner;
use super::error::ConnectionError;
use super::types::{Banner, ProxyConfig};

/// Performs a SOCKS5 CONNECT handshake to `proxy`, targeting `(host,
/// port)`, then reads the SMTP banner. The proxy handshake and the banner
/// wait are budgeted against independent timers (§4.3 Two-phase timeouts).
pub async fn connect_socks5(
    host: &str,
    port: u16,
    proxy: &ProxyConfig,
    config: &Config,
) -> Result<(Socks5Stream<TcpStream>, Banner), ConnectionError> {
    let handshake = async {
        match &proxy.credentials {
            Some((user, pass)) => {
                Socks5Stream::connect_with_password(
                    proxy.addr,
                    host.to_string(),
                    port,
                    user.clone(),
                    pass.clone(),
                    Socks5Config::default(),
                )
                .await
            }
            None => {
                Socks5Stream::connect(proxy.addr, host.to_string(), port, Socks5Config::default()).await
            }
        }
    };

    let mut stream = timeout(config.proxy_handshake_timeout, handshake)
        .await
        .map_err(|_| ConnectionError::ProxyHandshakeTimeout)?
        .map_err(map_socks_error)?;

    let banner = read_banner(&mut stream, config.smtp_banner_timeout).await?;
    Ok((stream, banner))
}

fn map_socks_error(err: fast_socks5::SocksError) -> ConnectionError {
    match err {
        fast_socks5::SocksError::ReplyError(ReplyError::GeneralFailure) => {
            ConnectionError::from_socks_reply(0x01, "general SOCKS server failure")
        }
        fast_socks5::SocksError::ReplyError(ReplyError::ConnectionNotAllowed) => {
            ConnectionError::from_socks_reply(0x02, "connection not allowed by ruleset")
        }
        fast_socks5::SocksError::ReplyError(ReplyError::NetworkUnreachable) => {
            ConnectionError::from_socks_reply(0x03, "network unreachable")
        }
        fast_socks5::SocksError::ReplyError(ReplyError::HostUnreachable) => {
            ConnectionError::from_socks_reply(0x04, "host unreachable")
        }
        fast_socks5::SocksError::ReplyError(ReplyError::ConnectionRefused) => {
            ConnectionError::from_socks_reply(0x05, "connection refused")
        }
        fast_socks5::SocksError::ReplyError(ReplyError::TtlExpired) => {
            ConnectionError::from_socks_reply(0x06, "TTL expired")
        }
        fast_socks5::SocksError::ReplyError(ReplyError::CommandNotSupported) => {
            ConnectionError::from_socks_reply(0x07, "command not supported")
        }
        fast_socks5::SocksError::ReplyError(ReplyError::AddressTypeNotSupported) => {
            ConnectionError::from_socks_reply(0x08, "address type not supported")
        }
        fast_socks5::SocksError::ReplyError(ReplyError::ConnectionTimeout) => ConnectionError::ProxyHandshakeTimeout,
        fast_socks5::SocksError::Io(io_err) => ConnectionError::ProxyConnectionFailed(io_err.to_string()),
        other => ConnectionError::ProxyConnectionFailed(other.to_string()),
    }
}
