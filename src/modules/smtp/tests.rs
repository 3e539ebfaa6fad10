use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::modules::contact::message::{Addr, MailMessage};
use crate::modules::contact::transport::{MailTransport, TransportError};
use crate::modules::settings::cli::Settings;
use crate::modules::smtp::executor::{envelope, SmtpExecutor};
use crate::modules::smtp::manager::SmtpConfig;
use crate::modules::smtp::pool::build_smtp_pool;
use crate::modules::smtp::util::generate_message_id;

/// Minimal SMTP relay: no STARTTLS, no AUTH, refuses RCPT for any address
/// containing one of `refused`. Every received line is recorded.
async fn fake_relay(refused: &'static [&'static str]) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    spawn_relay(refused, false).await
}

/// Like [`fake_relay`], but never answers once the message body is in.
async fn stalling_relay() -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    spawn_relay(&[], true).await
}

async fn spawn_relay(
    refused: &'static [&'static str],
    stall_after_data: bool,
) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();
        write.write_all(b"220 localhost ESMTP ready\r\n").await.unwrap();

        let mut in_data = false;
        while let Ok(Some(line)) = lines.next_line().await {
            log.lock().unwrap().push(line.clone());
            if in_data {
                if line == "." {
                    if stall_after_data {
                        std::future::pending::<()>().await;
                    }
                    in_data = false;
                    write.write_all(b"250 2.0.0 Queued\r\n").await.unwrap();
                }
                continue;
            }

            let command = line.to_ascii_uppercase();
            let reply: &[u8] = if command.starts_with("EHLO") {
                b"250-localhost\r\n250 8BITMIME\r\n"
            } else if command.starts_with("RCPT TO") && refused.iter().any(|r| line.contains(r)) {
                b"550 5.1.1 No such user\r\n"
            } else if command == "DATA" {
                in_data = true;
                b"354 Start mail input\r\n"
            } else if command == "QUIT" {
                write.write_all(b"221 Bye\r\n").await.unwrap();
                break;
            } else {
                b"250 OK\r\n"
            };
            write.write_all(reply).await.unwrap();
        }
    });

    (address, received)
}

fn config_for(address: SocketAddr) -> SmtpConfig {
    SmtpConfig {
        host: address.ip().to_string(),
        port: address.port(),
        secure: false,
        credentials: None,
        timeout: Duration::from_secs(5),
        pool_size: 1,
    }
}

fn message(to: &[&str]) -> MailMessage {
    MailMessage {
        from: Addr::new(Some("Alice".into()), "relay@example.com"),
        to: to.iter().map(|t| t.to_string()).collect(),
        reply_to: Some("a@x.com".into()),
        subject: "New Contact Form: Alice".into(),
        text: "line1\nline2".into(),
        html: "<p>line1<br>line2</p>".into(),
    }
}

fn install_crypto_provider() {
    let _ = rustls::crypto::CryptoProvider::install_default(
        rustls::crypto::ring::default_provider(),
    );
}

#[test]
fn message_ids_are_unique_and_scoped() {
    let first = generate_message_id();
    let second = generate_message_id();
    assert_ne!(first, second);
    assert!(first.ends_with("@contact-relay"));
    assert!(!first.starts_with('<'));
}

#[test]
fn credentials_require_both_user_and_password() {
    let mut settings = Settings::new_for_test();
    let config = SmtpConfig::from(&settings);
    assert_eq!(
        config.credentials,
        Some(("relay@example.com".to_string(), "secret".to_string()))
    );
    assert_eq!(config.address(), "localhost:2525");

    settings.email_pass = None;
    assert_eq!(SmtpConfig::from(&settings).credentials, None);
}

#[tokio::test]
async fn delivers_through_relay() {
    install_crypto_provider();
    let (address, received) = fake_relay(&[]).await;
    let executor = SmtpExecutor::new(build_smtp_pool(config_for(address)).await.unwrap());

    let message_id = executor
        .send(&message(&["admin@example.com"]))
        .await
        .unwrap();

    let received = received.lock().unwrap().clone();
    assert!(received.iter().any(|l| l.starts_with("MAIL FROM:<relay@example.com>")));
    assert!(received.iter().any(|l| l.starts_with("RCPT TO:<admin@example.com>")));
    assert!(received.iter().any(|l| l.eq_ignore_ascii_case("DATA")));
    assert!(received.iter().any(|l| l.contains(&message_id)));
}

#[tokio::test]
async fn refused_recipients_are_reported_together() {
    install_crypto_provider();
    let (address, received) =
        fake_relay(&["ops@example.com", "boss@example.com"]).await;
    let executor = SmtpExecutor::new(build_smtp_pool(config_for(address)).await.unwrap());

    let error = executor
        .send(&message(&["ops@example.com", "ok@example.com", "boss@example.com"]))
        .await
        .unwrap_err();

    let TransportError::Rejected { rejections } = error else {
        panic!("expected per-recipient rejections");
    };
    assert_eq!(rejections.len(), 2);
    assert!(rejections[0].starts_with("ops@example.com: "));
    assert!(rejections[1].starts_with("boss@example.com: "));

    let received = received.lock().unwrap().clone();
    assert!(received.iter().any(|l| l.eq_ignore_ascii_case("RSET")));
    assert!(!received.iter().any(|l| l.eq_ignore_ascii_case("DATA")));
}

#[tokio::test]
async fn unreachable_relay_is_a_delivery_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let executor = SmtpExecutor::new(build_smtp_pool(config_for(address)).await.unwrap());
    let started = Instant::now();
    let error = executor
        .send(&message(&["admin@example.com"]))
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(2));
    match error {
        TransportError::Delivery { message } => {
            assert!(message.contains(&format!("Failed to connect to {}", address)))
        }
        other => panic!("expected delivery error, got {other:?}"),
    }
}

#[tokio::test]
async fn stalled_relay_is_bounded_by_client_timeout() {
    install_crypto_provider();
    let (address, received) = stalling_relay().await;
    let config = SmtpConfig {
        timeout: Duration::from_secs(1),
        ..config_for(address)
    };
    let executor = SmtpExecutor::new(build_smtp_pool(config).await.unwrap());

    let started = Instant::now();
    let error = executor
        .send(&message(&["admin@example.com"]))
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(matches!(error, TransportError::Delivery { .. }), "{error:?}");
    assert!(received.lock().unwrap().iter().any(|l| l == "."));
}

#[tokio::test]
async fn line_breaks_never_reach_the_envelope() {
    install_crypto_provider();
    let (address, received) = fake_relay(&[]).await;
    let executor = SmtpExecutor::new(build_smtp_pool(config_for(address)).await.unwrap());

    let error = executor
        .send(&message(&["a@x.com>\r\nRCPT TO:<victim@evil.com"]))
        .await
        .unwrap_err();

    assert!(matches!(error, TransportError::Delivery { .. }), "{error:?}");
    let received = received.lock().unwrap().clone();
    assert!(!received.iter().any(|l| l.contains("victim@evil.com")));
}

#[test]
fn envelope_keeps_recipient_order_without_duplicates() {
    let message = message(&["ops@example.com", "boss@example.com", "ops@example.com"]);
    let envelope = envelope(&message, b"body".to_vec()).unwrap();

    let rcpt: Vec<&str> = envelope.rcpt_to.iter().map(|a| a.email.as_ref()).collect();
    assert_eq!(rcpt, vec!["ops@example.com", "boss@example.com"]);
    assert_eq!(envelope.mail_from.email, "relay@example.com");
}
