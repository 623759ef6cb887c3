//! End-to-end tests against a scripted loopback SMTP server.

use mailverify::connection::{connect_to_smtp, ConnectionError, ProxyConfig};
use mailverify::smtp::SmtpSession;
use mailverify::Config;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn spawn_mock_server(script: Vec<(&'static str, &'static str)>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
    let port = listener.local_addr().expect("addr").port();

    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            let _ = handle_session(stream, script).await;
        }
    });

    port
}

async fn handle_session(mut stream: TcpStream, script: Vec<(&'static str, &'static str)>) -> std::io::Result<()> {
    stream.write_all(b"220 mock.smtp.test ESMTP\r\n").await?;
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    for (expected, response) in script {
        loop {
            if let Some(pos) = find_crlf(&buf) {
                let line: Vec<u8> = buf.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                assert!(
                    line.starts_with(expected),
                    "expected command starting with '{expected}', got '{line}'"
                );
                break;
            }
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        stream.write_all(response.as_bytes()).await?;
    }
    Ok(())
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n").map(|p| p + 1)
}

#[tokio::test]
async fn catch_all_domain_is_deliverable_and_catch_all() {
    let port = spawn_mock_server(vec![
        ("EHLO", "250 mock.example\r\n"),
        ("MAIL FROM:", "250 2.1.0 Ok\r\n"),
        ("RCPT TO:", "250 2.1.5 Ok\r\n"),
        ("RCPT TO:", "250 2.1.5 Ok\r\n"),
        ("QUIT", "221 2.0.0 Bye\r\n"),
    ])
    .await;

    let config = Config::default();
    let (transport, _banner) = connect_to_smtp("127.0.0.1", port, None, &config)
        .await
        .expect("connect");
    let mut session = SmtpSession::new(transport, &config);

    session.hello("verify.example.com", &config).await.unwrap();
    session.mail_from("verify@example.com", &config).await.unwrap();
    let probe = session
        .rcpt_to("verify-abc123456789@example.com", &config)
        .await
        .unwrap();
    let target = session.rcpt_to("user@example.com", &config).await.unwrap();
    session.quit().await;

    assert!(probe.is_success());
    assert!(target.is_success());
}

#[tokio::test]
async fn full_mailbox_reply_is_classified_as_permanent_with_quota_message() {
    let port = spawn_mock_server(vec![
        ("EHLO", "250 mock.example\r\n"),
        ("MAIL FROM:", "250 2.1.0 Ok\r\n"),
        ("RCPT TO:", "550 5.1.1 no such user\r\n"),
        ("RCPT TO:", "552 5.2.2 Mailbox full\r\n"),
        ("QUIT", "221 2.0.0 Bye\r\n"),
    ])
    .await;

    let config = Config::default();
    let (transport, _banner) = connect_to_smtp("127.0.0.1", port, None, &config)
        .await
        .expect("connect");
    let mut session = SmtpSession::new(transport, &config);

    session.hello("verify.example.com", &config).await.unwrap();
    session.mail_from("verify@example.com", &config).await.unwrap();
    let _probe = session.rcpt_to("verify-abc123456789@example.com", &config).await.unwrap();
    let target = session.rcpt_to("full@example.com", &config).await.unwrap();
    session.quit().await;

    assert_eq!(target.code, 552);
    assert!(target.is_permanent_fail());
    assert!(target.message.to_lowercase().contains("full"));

    let verdict = mailverify::verifier::types::Verdict {
        status: mailverify::verifier::types::VerdictStatus::Valid,
        reason: "Recipient accepted".to_string(),
        details: mailverify::verifier::types::VerdictDetails {
            smtp_code: Some(target.code),
            smtp_message: Some(target.message.clone()),
            catch_all_active: false,
            greylisted: false,
        },
    };
    let public = mailverify::to_public_result(&verdict);
    assert!(public.has_full_inbox);
    assert!(!public.is_deliverable);
}

#[tokio::test]
async fn disabled_account_reply_forces_not_deliverable() {
    let port = spawn_mock_server(vec![
        ("EHLO", "250 mock.example\r\n"),
        ("MAIL FROM:", "250 2.1.0 Ok\r\n"),
        ("RCPT TO:", "550 5.1.1 no such user\r\n"),
        ("RCPT TO:", "550 Account disabled\r\n"),
        ("QUIT", "221 2.0.0 Bye\r\n"),
    ])
    .await;

    let config = Config::default();
    let (transport, _banner) = connect_to_smtp("127.0.0.1", port, None, &config)
        .await
        .expect("connect");
    let mut session = SmtpSession::new(transport, &config);

    session.hello("verify.example.com", &config).await.unwrap();
    session.mail_from("verify@example.com", &config).await.unwrap();
    let _probe = session.rcpt_to("verify-abc123456789@example.com", &config).await.unwrap();
    let target = session.rcpt_to("locked@example.com", &config).await.unwrap();
    session.quit().await;

    assert_eq!(target.code, 550);
    assert!(target.message.to_lowercase().contains("disabled"));
}

#[tokio::test]
async fn ehlo_rejected_falls_back_to_helo_against_real_socket() {
    let port = spawn_mock_server(vec![
        ("EHLO", "500 unrecognized command\r\n"),
        ("HELO", "250 mock.example hello\r\n"),
        ("MAIL FROM:", "250 2.1.0 Ok\r\n"),
        ("QUIT", "221 2.0.0 Bye\r\n"),
    ])
    .await;

    let config = Config::default();
    let (transport, _banner) = connect_to_smtp("127.0.0.1", port, None, &config)
        .await
        .expect("connect");
    let mut session = SmtpSession::new(transport, &config);

    let hello = session.hello("verify.example.com", &config).await.unwrap();
    assert!(hello.is_success());
    session.mail_from("verify@example.com", &config).await.unwrap();
    session.quit().await;
}

#[tokio::test]
async fn socks_proxy_on_closed_port_fails_to_connect() {
    // Bind then immediately drop the listener to get a port nothing is
    // listening on anymore (§8 scenario 8: proxy refused).
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let proxy = ProxyConfig {
        addr: format!("127.0.0.1:{port}").parse().unwrap(),
        credentials: None,
    };
    let config = Config::default();
    let result = connect_to_smtp("mail.example.com", 25, Some(&proxy), &config).await;
    let err = result.unwrap_err();
    assert!(
        matches!(err, ConnectionError::ProxyConnectionFailed(_)),
        "expected a proxy-phase failure, got {err:?}"
    );
}
