use std::net::SocketAddr;

/// Optional SOCKS5 proxy the Connection Layer routes through instead of a
/// direct TCP connection (§4.3 SOCKS5 path).
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub addr: SocketAddr,
    pub credentials: Option<(String, String)>,
}

/// The successfully framed SMTP banner, returned alongside the live
/// transport (§4.3 Contract).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub code: u16,
    pub text: String,
}

/// Which side of a SOCKS5 handshake a reply code is attributed to
/// (§4.3 SOCKS5 error attribution).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksPhase {
    Proxy,
    Target,
}
