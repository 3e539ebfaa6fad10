// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use futures::future::BoxFuture;
use snafu::Snafu;

use crate::modules::contact::message::MailMessage;
use crate::modules::error::ContactRelayError;

/// Why a single send failed.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum TransportError {
    /// Connection, authentication, timeout or DATA failure.
    #[snafu(display("{message}"))]
    Delivery { message: String },
    /// One entry per recipient the relay refused.
    #[snafu(display("{}", rejections.join("; ")))]
    Rejected { rejections: Vec<String> },
}

impl From<ContactRelayError> for TransportError {
    fn from(error: ContactRelayError) -> Self {
        TransportError::Delivery {
            message: error.to_string(),
        }
    }
}

/// Something that can deliver a [`MailMessage`].
///
/// Returns the identifier the message was sent under. Implementations must
/// tolerate concurrent calls from independent requests.
pub trait MailTransport: Send + Sync {
    fn send<'a>(&'a self, message: &'a MailMessage) -> BoxFuture<'a, Result<String, TransportError>>;
}
