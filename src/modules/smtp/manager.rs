// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::ContactRelayResult;
use crate::modules::settings::cli::Settings;
use crate::modules::smtp::client::RelaySmtpClient;
use crate::raise_error;
use mail_send::smtp::tls::build_tls_connector;
use mail_send::smtp::AssertReply;
use mail_send::{Credentials, SmtpClient};
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

pub const EXT_START_TLS: u32 = 1 << 24;

/// Connection settings for the SMTP relay, read once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS from the first byte. When off, STARTTLS is still used if offered.
    pub secure: bool,
    /// Username and password; authentication is skipped when absent.
    pub credentials: Option<(String, String)>,
    pub timeout: Duration,
    pub pool_size: u32,
}

impl From<&Settings> for SmtpConfig {
    fn from(settings: &Settings) -> Self {
        let credentials = match (&settings.email_user, &settings.email_pass) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };
        Self {
            host: settings.email_host.clone(),
            port: settings.email_port,
            secure: settings.email_secure,
            credentials,
            timeout: Duration::from_secs(settings.smtp_timeout_secs),
            pool_size: settings.smtp_pool_size,
        }
    }
}

impl SmtpConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub struct SmtpClientManager {
    config: SmtpConfig,
}

impl SmtpClientManager {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    pub async fn build(&self) -> ContactRelayResult<RelaySmtpClient> {
        let address = self.config.address();
        let timeout = self.config.timeout;

        let tcp_stream = tokio::time::timeout(timeout, TcpStream::connect(&address))
            .await
            .map_err(|_| {
                raise_error!(
                    format!("Connection to {} timed out", address),
                    ErrorCode::ConnectionTimeout
                )
            })?
            .map_err(|e| {
                raise_error!(
                    format!("Failed to connect to {}: {}", address, e),
                    ErrorCode::SmtpConnectionFailed
                )
            })?;

        let credentials = self
            .config
            .credentials
            .as_ref()
            .map(|(user, pass)| Credentials::new(user.clone(), pass.clone()));

        let client = Self::connect(
            self.config.secure,
            &self.config.host,
            timeout,
            tcp_stream,
            credentials,
        )
        .await
        .map_err(|e| raise_error!(e.to_string(), ErrorCode::SmtpConnectionFailed))?;

        debug!("Opened SMTP connection to {}", address);
        Ok(client)
    }

    async fn connect(
        secure: bool,
        host: &str,
        timeout: Duration,
        tcp_stream: TcpStream,
        credentials: Option<Credentials<String>>,
    ) -> Result<RelaySmtpClient, mail_send::Error> {
        tokio::time::timeout(timeout, async {
            let mut client = SmtpClient {
                stream: tcp_stream,
                timeout,
            };

            let local_host = gethostname::gethostname()
                .to_str()
                .unwrap_or("[127.0.0.1]")
                .to_string();
            // relay certificates are not verified
            let tls_connector = build_tls_connector(true);

            if secure {
                let mut client = client.into_tls(&tls_connector, host).await?;
                // Read greeting
                client.read().await?.assert_positive_completion()?;
                let capabilities = client.capabilities(&local_host, false).await?;
                if let Some(credentials) = &credentials {
                    client.authenticate(credentials, &capabilities).await?;
                }
                return Ok(RelaySmtpClient::Tls(client));
            }

            // Read greeting
            client.read().await?.assert_positive_completion()?;
            let response = client.ehlo(&local_host).await?;
            if response.has_capability(EXT_START_TLS) {
                let mut client = client.start_tls(&tls_connector, host).await?;
                let capabilities = client.capabilities(&local_host, false).await?;
                if let Some(credentials) = &credentials {
                    client.authenticate(credentials, &capabilities).await?;
                }
                Ok(RelaySmtpClient::Tls(client))
            } else {
                if let Some(credentials) = &credentials {
                    client.authenticate(credentials, &response).await?;
                }
                Ok(RelaySmtpClient::Plain(client))
            }
        })
        .await
        .map_err(|_| mail_send::Error::Timeout)?
    }
}
