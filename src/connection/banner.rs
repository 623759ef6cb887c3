//! Shared SMTP banner reception, common to the direct and SOCKS5 paths
//! (§4.3 Banner reception).

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

use super::error::ConnectionError;
use super::types::Banner;

/// Waits for one data chunk within `banner_timeout` and validates that it
/// starts with a 220 reply code. The caller is expected to drop the
/// transport on any error this returns.
pub async fn read_banner<S>(stream: &mut S, banner_timeout: Duration) -> Result<Banner, ConnectionError>
where
    S: AsyncRead + Unpin,
{
    let mut buf = [0u8; 512];
    let n = timeout(banner_timeout, stream.read(&mut buf))
        .await
        .map_err(|_| ConnectionError::SmtpBannerTimeout)?
        .map_err(ConnectionError::SmtpSocketError)?;

    if n == 0 {
        return Err(ConnectionError::SmtpBannerTimeout);
    }

    let text = String::from_utf8_lossy(&buf[..n]).trim_end().to_string();
    let looks_like_220 = text.len() >= 4
        && text.as_bytes()[..3].iter().all(u8::is_ascii_digit)
        && &text[..3] == "220"
        && matches!(text.as_bytes()[3], b' ' | b'-');

    if !looks_like_220 {
        return Err(ConnectionError::SmtpBannerInvalid(text));
    }

    Ok(Banner { code: 220, text })
}
