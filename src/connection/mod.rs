//! Establishing the transport an SMTP session runs over, direct or
//! SOCKS5-tunneled (§2, §4.3).

pub mod banner;
pub mod direct;
pub mod error;
pub mod socks5;
pub mod types;

pub use error::ConnectionError;
pub use types::{Banner, ProxyConfig};

use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::Config;

/// Object-safe alias for whatever stream the SMTP session ends up driving,
/// direct `TcpStream` or `Socks5Stream<TcpStream>` alike.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Connects to `(host, port)`, optionally through `proxy`, and returns the
/// live transport alongside its SMTP banner. No socket is leaked on
/// failure (§4.3 Contract).
pub async fn connect_to_smtp(
    host: &str,
    port: u16,
    proxy: Option<&ProxyConfig>,
    config: &Config,
) -> Result<(Box<dyn Transport>, Banner), ConnectionError> {
    match proxy {
        Some(proxy) => {
            let (stream, banner) = socks5::connect_socks5(host, port, proxy, config).await?;
            Ok((Box::new(stream), banner))
        }
        None => {
            let (stream, banner) = direct::connect_direct(host, port, config).await?;
            Ok((Box::new(stream), banner))
        }
    }
}
