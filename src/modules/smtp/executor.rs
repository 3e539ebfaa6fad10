// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::contact::message::MailMessage;
use crate::modules::contact::transport::{MailTransport, TransportError};
use crate::modules::smtp::pool::SmtpPool;
use crate::modules::smtp::util::generate_message_id;
use futures::future::BoxFuture;
use futures::FutureExt;
use mail_send::smtp::message::Message;

/// [`MailTransport`] backed by a pool of SMTP connections to the relay.
pub struct SmtpExecutor {
    pool: SmtpPool,
}

impl SmtpExecutor {
    pub fn new(pool: SmtpPool) -> Self {
        Self { pool }
    }

    pub async fn send_email(&self, message: &MailMessage) -> Result<String, TransportError> {
        let message_id = generate_message_id();
        let body = message
            .to_builder(&message_id)
            .write_to_vec()
            .map_err(|e| TransportError::Delivery {
                message: format!("Failed to build message: {}", e),
            })?;
        let envelope = envelope(message, body)?;

        let mut client = self.pool.get().await?;
        client.send_envelope(&envelope).await?;
        Ok(message_id)
    }
}

impl MailTransport for SmtpExecutor {
    fn send<'a>(&'a self, message: &'a MailMessage) -> BoxFuture<'a, Result<String, TransportError>> {
        self.send_email(message).boxed()
    }
}

/// SMTP envelope for `message`. Recipients are offered in the order given,
/// once each.
pub fn envelope<'a>(message: &'a MailMessage, body: Vec<u8>) -> Result<Message<'a>, TransportError> {
    envelope_address(&message.from.address)?;

    let mut seen: Vec<&str> = Vec::with_capacity(message.to.len());
    let mut envelope = Message::empty()
        .from(message.from.address.as_str())
        .body(body);
    for rcpt in &message.to {
        envelope_address(rcpt)?;
        if !seen.contains(&rcpt.as_str()) {
            seen.push(rcpt);
            envelope = envelope.to(rcpt.as_str());
        }
    }
    Ok(envelope)
}

fn envelope_address(address: &str) -> Result<(), TransportError> {
    if address.contains(['\r', '\n', '<', '>']) {
        return Err(TransportError::Delivery {
            message: format!("Invalid envelope address: {:?}", address),
        });
    }
    Ok(())
}
