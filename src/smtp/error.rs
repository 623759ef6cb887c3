use thiserror::Error;

use super::types::SessionState;

/// Protocol-level failures (§7 taxonomy, Protocol kinds).
#[derive(Debug, Error)]
pub enum SessionError {
    /// An attempt was made to issue a command the state machine does not
    /// permit from the current state. No bytes are written when this fires.
    #[error("illegal transition: cannot {attempted} from state {from:?}")]
    ProtocolViolation {
        from: SessionState,
        attempted: &'static str,
    },
    /// EHLO and the HELO fallback both failed.
    #[error("SMTP handshake failed: {0}")]
    HandshakeFailed(String),
    /// The peer closed the connection, or sent nothing, before a response
    /// could be framed.
    #[error("empty or truncated SMTP response")]
    EmptyResponse,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("operation timed out")]
    Timeout,
}
