//! The direct-TCP connection path (§4.3 Direct path).

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::Config;

use super::banner::read_banner;
use super::error::ConnectionError;
use super::types::Banner;

/// Opens a direct TCP connection to `(host, port)` and reads the SMTP
/// banner. The socket is dropped on any failure; nothing is leaked back to
/// the caller.
pub async fn connect_direct(
    host: &str,
    port: u16,
    config: &Config,
) -> Result<(TcpStream, Banner), ConnectionError> {
    tracing::debug!(target: "connection", %host, port, "opening direct TCP connection");
    let mut stream = timeout(config.tcp_connect_timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| ConnectionError::SocketTimeout)?
        .map_err(|e| ConnectionError::SmtpConnectionFailed(e.to_string()))?;

    let banner = read_banner(&mut stream, config.smtp_banner_timeout).await?;
    Ok((stream, banner))
}
