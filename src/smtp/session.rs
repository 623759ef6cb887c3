//! The SMTP session state machine (§3 Session State, §4.4).
//!
//! Generic over any `AsyncRead + AsyncWrite` transport so the same session
//! logic runs over a direct TCP stream or a SOCKS5-tunneled one (the
//! connection layer hands either one in, already connected and past the
//! banner). Owns the stream, exposes command/response-driving primitives,
//! and enforces a checked state machine with a buffer that survives
//! across commands.

use rand::Rng;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::config::{Config, JitterStage};

use super::error::SessionError;
use super::response::{self, ParseOutcome};
use super::types::{SmtpResponse, SessionState};

const READ_CHUNK: usize = 4096;

pub struct SmtpSession<S> {
    stream: S,
    state: SessionState,
    buffer: Vec<u8>,
    command_timeout: std::time::Duration,
    graceful_close_timeout: std::time::Duration,
}

impl<S> SmtpSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an already-connected, post-banner transport. Establishing and
    /// tearing down the transport itself is the connection layer's job
    /// (§4.3); the session only drives the protocol from here on.
    pub fn new(stream: S, config: &Config) -> Self {
        Self {
            stream,
            state: SessionState::Connected,
            buffer: Vec::new(),
            command_timeout: config.smtp_command_timeout,
            graceful_close_timeout: config.graceful_close_timeout,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// EHLO, falling back to HELO on `{500, 501, 502}` (§4.4).
    pub async fn hello(
        &mut self,
        helo_domain: &str,
        config: &Config,
    ) -> Result<SmtpResponse, SessionError> {
        self.require(SessionState::Connected, "hello")?;

        self.jitter(config.jitter_for(JitterStage::Ehlo)).await;
        self.write_command(&format!("EHLO {helo_domain}")).await?;
        let response = self.read_response().await?;

        if response.is_success() {
            self.state = SessionState::HelloSent;
            return Ok(response);
        }

        if matches!(response.code, 500 | 501 | 502) {
            self.jitter(config.jitter_for(JitterStage::HeloFallback)).await;
            self.write_command(&format!("HELO {helo_domain}")).await?;
            let fallback = self.read_response().await?;
            if fallback.is_success() {
                self.state = SessionState::HelloSent;
                return Ok(fallback);
            }
            return Err(SessionError::HandshakeFailed(format!(
                "HELO rejected with {}",
                fallback.code
            )));
        }

        tracing::debug!(target: "smtp_session", code = response.code, "EHLO rejected, not a fallback-eligible code");
        Err(SessionError::HandshakeFailed(format!(
            "EHLO rejected with {}",
            response.code
        )))
    }

    pub async fn mail_from(
        &mut self,
        sender: &str,
        config: &Config,
    ) -> Result<SmtpResponse, SessionError> {
        self.require(SessionState::HelloSent, "mailFrom")?;
        self.jitter(config.jitter_for(JitterStage::MailFrom)).await;
        self.write_command(&format!("MAIL FROM:<{sender}>")).await?;
        let response = self.read_response().await?;
        self.state = SessionState::MailFromSent;
        Ok(response)
    }

    /// `RCPT TO`, self-looping on `RcptToSent` so repeated probes (the
    /// catch-all check and the target check) share one session.
    pub async fn rcpt_to(
        &mut self,
        recipient: &str,
        config: &Config,
    ) -> Result<SmtpResponse, SessionError> {
        match self.state {
            SessionState::MailFromSent | SessionState::RcptToSent => {}
            other => {
                return Err(SessionError::ProtocolViolation {
                    from: other,
                    attempted: "rcptTo",
                });
            }
        }
        self.jitter(config.jitter_for(JitterStage::RcptTo)).await;
        self.write_command(&format!("RCPT TO:<{recipient}>")).await?;
        let response = self.read_response().await?;
        self.state = SessionState::RcptToSent;
        Ok(response)
    }

    /// Best-effort `QUIT` followed by a graceful close. Never fails: errors
    /// writing or reading are swallowed, per §4.4.
    pub async fn quit(&mut self) {
        tracing::debug!(target: "smtp_session", state = ?self.state, "closing session");
        if self.state != SessionState::Disconnected {
            let _ = self.write_command("QUIT").await;
            self.state = SessionState::QuitSent;
        }
        let _ = self.stream.shutdown().await;
        let _ = timeout(self.graceful_close_timeout, self.drain_until_closed()).await;
        self.state = SessionState::Disconnected;
    }

    async fn drain_until_closed(&mut self) {
        let mut scratch = [0u8; 256];
        loop {
            match self.stream.read(&mut scratch).await {
                Ok(0) | Err(_) => return,
                Ok(_) => continue,
            }
        }
    }

    fn require(&self, expected: SessionState, attempted: &'static str) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::ProtocolViolation {
                from: self.state,
                attempted,
            })
        }
    }

    async fn jitter(&self, (min, max): (std::time::Duration, std::time::Duration)) {
        let lo = min.as_millis().max(1) as u64;
        let hi = max.as_millis().max(lo as u128) as u64;
        let delay_ms = if hi > lo {
            rand::thread_rng().gen_range(lo..=hi)
        } else {
            lo
        };
        tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
    }

    async fn write_command(&mut self, command: &str) -> Result<(), SessionError> {
        let mut bytes = command.as_bytes().to_vec();
        bytes.extend_from_slice(b"\r\n");
        timeout(self.command_timeout, self.stream.write_all(&bytes))
            .await
            .map_err(|_| SessionError::Timeout)??;
        Ok(())
    }

    /// Reads and accumulates bytes until the parser frames a complete
    /// response, re-parsing the growing buffer each time (§9).
    async fn read_response(&mut self) -> Result<SmtpResponse, SessionError> {
        let command_timeout = self.command_timeout;
        timeout(command_timeout, async {
            loop {
                if let ParseOutcome::Complete { response, consumed } = response::parse(&self.buffer)
                {
                    self.buffer.drain(..consumed);
                    return Ok(response);
                }
                let mut chunk = [0u8; READ_CHUNK];
                let n = self.stream.read(&mut chunk).await?;
                if n == 0 {
                    return Err(SessionError::EmptyResponse);
                }
                self.buffer.extend_from_slice(&chunk[..n]);
            }
        })
        .await
        .map_err(|_| SessionError::Timeout)?
    }
}
