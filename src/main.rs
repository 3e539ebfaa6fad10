use std::sync::Arc;

use clap::Parser;
use mimalloc::MiMalloc;
use modules::{
    common::rustls::RelayTls,
    contact::handler::{ContactHandler, ContactProfile},
    context::Initialize,
    error::ContactRelayResult,
    logger,
    rest::start_http_server,
    settings::cli::Settings,
    smtp::{executor::SmtpExecutor, manager::SmtpConfig, pool::build_smtp_pool},
};
use tracing::{info, warn};

mod modules;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ContactRelayResult<()> {
    let settings = Settings::parse();
    if let Err(error) = logger::initialize_logging(&settings) {
        eprintln!("{}", error);
        return Err(error);
    }
    info!("Starting contact-relay");
    info!("Version:  {}", relay_version!());

    let handler = match initialize(&settings).await {
        Ok(handler) => handler,
        Err(error) => {
            eprintln!("{:?}", error);
            return Err(error);
        }
    };

    start_http_server(&settings, handler).await?;
    info!("Contact Relay API Service stopped");
    Ok(())
}

/// Builds the shared contact handler on top of a pooled SMTP transport.
async fn initialize(settings: &Settings) -> ContactRelayResult<Arc<ContactHandler>> {
    RelayTls::initialize().await?;

    let smtp_config = SmtpConfig::from(settings);
    info!(
        "SMTP relay: {} (implicit TLS: {}, authenticated: {})",
        smtp_config.address(),
        smtp_config.secure,
        smtp_config.credentials.is_some()
    );
    let profile = ContactProfile::from(settings);
    if profile.admin_recipients.is_empty() {
        warn!("ADMIN_EMAIL is not set; admin notifications will fail until it is configured");
    }

    let pool = build_smtp_pool(smtp_config).await?;
    let executor = SmtpExecutor::new(pool);
    let handler = ContactHandler::new(Arc::new(executor), profile)?;
    Ok(Arc::new(handler))
}
