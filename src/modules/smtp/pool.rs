use crate::modules::error::code::ErrorCode;
use crate::modules::error::ContactRelayError;
use crate::modules::error::ContactRelayResult;
use crate::modules::smtp::client::RelaySmtpClient;
use crate::modules::smtp::manager::{SmtpClientManager, SmtpConfig};
use crate::raise_error;
use bb8::{ErrorSink, Pool, PooledConnection};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::warn;

impl bb8::ManageConnection for SmtpClientManager {
    type Connection = RelaySmtpClient;
    type Error = ContactRelayError;

    async fn connect(&self) -> ContactRelayResult<Self::Connection> {
        self.build().await
    }

    // call this function before using the connection
    async fn is_valid(&self, conn: &mut Self::Connection) -> ContactRelayResult<()> {
        conn.send_noop().await?;
        conn.reset().await
    }

    fn has_broken(&self, _: &mut Self::Connection) -> bool {
        false
    }
}

/// Receives the errors bb8 does not hand back to `get()`.
///
/// Connect failures are kept and announced so that waiting checkouts can
/// fail with the real cause. Stale pooled connections failing NOOP/RSET
/// are only logged; bb8 replaces them on its own.
#[derive(Debug, Clone, Default)]
pub struct ConnectErrorSink {
    last: Arc<Mutex<Option<(String, ErrorCode)>>>,
    failed: Arc<Notify>,
}

impl ConnectErrorSink {
    fn last_error(&self) -> ContactRelayError {
        let last = self.last.lock().ok().and_then(|last| last.clone());
        match last {
            Some((message, code)) => raise_error!(message, code),
            None => raise_error!(
                "Failed to connect to the SMTP relay".into(),
                ErrorCode::SmtpConnectionFailed
            ),
        }
    }
}

impl ErrorSink<ContactRelayError> for ConnectErrorSink {
    fn sink(&self, error: ContactRelayError) {
        let code = error.code();
        match code {
            ErrorCode::ConnectionTimeout | ErrorCode::SmtpConnectionFailed => {
                if let Ok(mut last) = self.last.lock() {
                    *last = Some((error.to_string(), code));
                }
                self.failed.notify_waiters();
            }
            _ => warn!("Dropping pooled SMTP connection: {}", error),
        }
    }

    fn boxed_clone(&self) -> Box<dyn ErrorSink<ContactRelayError>> {
        Box::new(self.clone())
    }
}

/// Lazily connecting pool of relay connections.
pub struct SmtpPool {
    inner: Pool<SmtpClientManager>,
    connect_errors: ConnectErrorSink,
}

impl SmtpPool {
    /// Checks out a connection. A failed connect attempt made while waiting
    /// ends the wait with that failure instead of the pool timeout.
    pub async fn get(&self) -> ContactRelayResult<PooledConnection<'_, SmtpClientManager>> {
        let failed = self.connect_errors.failed.notified();
        tokio::select! {
            conn = self.inner.get() => conn.map_err(ContactRelayError::from),
            _ = failed => Err(self.connect_errors.last_error()),
        }
    }
}

pub async fn build_smtp_pool(config: SmtpConfig) -> ContactRelayResult<SmtpPool> {
    let timeout = config.timeout;
    let max_size = config.pool_size;
    let manager = SmtpClientManager::new(config);
    let connect_errors = ConnectErrorSink::default();
    let inner = Pool::builder()
        .connection_timeout(timeout)
        .idle_timeout(Duration::from_secs(120))
        .retry_connection(false)
        .max_size(max_size)
        .test_on_check_out(true)
        .error_sink(Box::new(connect_errors.clone()))
        .build(manager)
        .await?;
    Ok(SmtpPool {
        inner,
        connect_errors,
    })
}
