use tracing::debug;

use crate::{
    modules::{
        context::Initialize,
        error::{code::ErrorCode, ContactRelayResult},
    },
    raise_error,
};

pub struct RelayTls;

impl Initialize for RelayTls {
    async fn initialize() -> ContactRelayResult<()> {
        rustls::crypto::CryptoProvider::install_default(rustls::crypto::ring::default_provider())
            .map_err(|_| {
                raise_error!(
                    "failed to set crypto provider".into(),
                    ErrorCode::InternalError
                )
            })?;
        debug!("Installed ring as the process-wide rustls crypto provider");
        Ok(())
    }
}
