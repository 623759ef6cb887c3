use std::fmt;

/// Outcome of a completed SMTP reply line-range (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Success,
    Intermediate,
    TransientFail,
    PermanentFail,
    ProtocolError,
}

impl Classification {
    pub fn from_code(code: u16) -> Self {
        match code {
            200..=299 => Self::Success,
            300..=399 => Self::Intermediate,
            400..=499 => Self::TransientFail,
            500..=599 => Self::PermanentFail,
            _ => Self::ProtocolError,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "SUCCESS",
            Self::Intermediate => "INTERMEDIATE",
            Self::TransientFail => "TRANSIENT_FAIL",
            Self::PermanentFail => "PERMANENT_FAIL",
            Self::ProtocolError => "PROTOCOL_ERROR",
        };
        f.write_str(s)
    }
}

/// A fully framed SMTP response (§3 Data Model).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpResponse {
    pub code: u16,
    pub enhanced_code: Option<String>,
    pub message: String,
    pub lines: Vec<String>,
    pub classification: Classification,
}

impl SmtpResponse {
    pub fn is_success(&self) -> bool {
        self.classification == Classification::Success
    }

    pub fn is_transient_fail(&self) -> bool {
        self.classification == Classification::TransientFail
    }

    pub fn is_permanent_fail(&self) -> bool {
        self.classification == Classification::PermanentFail
    }
}

/// The session's linear state machine (§3 / §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    HelloSent,
    MailFromSent,
    RcptToSent,
    QuitSent,
}
