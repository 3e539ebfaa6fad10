use crate::modules::contact::transport::TransportError;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::ContactRelayResult;
use crate::raise_error;
use mail_send::smtp::message::Message;
use mail_send::SmtpClient;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;

pub enum RelaySmtpClient {
    Plain(SmtpClient<TcpStream>),
    Tls(SmtpClient<TlsStream<TcpStream>>),
}

impl RelaySmtpClient {
    pub async fn send_noop(&mut self) -> ContactRelayResult<()> {
        match self {
            RelaySmtpClient::Plain(smtp_client) => smtp_client
                .noop()
                .await
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::SmtpCommandFailed)),
            RelaySmtpClient::Tls(smtp_client) => smtp_client
                .noop()
                .await
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::SmtpCommandFailed)),
        }
    }

    pub async fn reset(&mut self) -> ContactRelayResult<()> {
        match self {
            RelaySmtpClient::Plain(smtp_client) => smtp_client
                .rset()
                .await
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::SmtpCommandFailed)),
            RelaySmtpClient::Tls(smtp_client) => smtp_client
                .rset()
                .await
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::SmtpCommandFailed)),
        }
    }

    /// Runs one MAIL/RCPT/DATA transaction within the client timeout.
    pub async fn send_envelope(&mut self, message: &Message<'_>) -> Result<(), TransportError> {
        match self {
            RelaySmtpClient::Plain(smtp_client) => deliver(smtp_client, message).await,
            RelaySmtpClient::Tls(smtp_client) => deliver(smtp_client, message).await,
        }
    }
}

/// Offers every recipient before giving up so that all refusals are reported
/// at once. Any refusal aborts the transaction; nothing is sent.
async fn deliver<T>(client: &mut SmtpClient<T>, message: &Message<'_>) -> Result<(), TransportError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let timeout = client.timeout;
    tokio::time::timeout(timeout, async {
        client
            .mail_from(message.mail_from.email.as_ref(), &message.mail_from.parameters)
            .await
            .map_err(delivery_error)?;

        let mut rejections = Vec::new();
        for rcpt in &message.rcpt_to {
            match client.rcpt_to(rcpt.email.as_ref(), &rcpt.parameters).await {
                Ok(()) => {}
                Err(e @ mail_send::Error::UnexpectedReply(_)) => {
                    rejections.push(format!("{}: {}", rcpt.email, e));
                }
                Err(e) => return Err(delivery_error(e)),
            }
        }

        if !rejections.is_empty() {
            // leave the connection clean for the next checkout
            let _ = client.rset().await;
            return Err(TransportError::Rejected { rejections });
        }

        client
            .data(message.body.as_ref())
            .await
            .map_err(delivery_error)
    })
    .await
    .map_err(|_| delivery_error(mail_send::Error::Timeout))?
}

fn delivery_error(error: mail_send::Error) -> TransportError {
    TransportError::Delivery {
        message: error.to_string(),
    }
}
