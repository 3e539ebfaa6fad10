// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::error::ErrorCapture;
use crate::modules::common::log::Tracing;
use crate::modules::contact::handler::ContactHandler;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::handler::error_handler;
use crate::modules::error::ContactRelayResult;
use crate::modules::{settings::cli::Settings, utils::shutdown::shutdown_signal};

use super::error::ApiErrorResponse;
use crate::raise_error;
use api::create_openapi_service;
use poem::listener::TcpListener;
use poem::middleware::{CatchPanic, Cors};
use poem::{Endpoint, EndpointExt, Route, Server};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub mod api;

pub type ApiResult<T, E = ApiErrorResponse> = std::result::Result<T, E>;

const DESCRIPTION: &str = r#"
    Contact form relay for static and server-rendered websites.

    Every accepted submission produces two emails through the configured SMTP relay:
    a notification to the site admin and a confirmation to the person who wrote in.
"#;

/// Assembles the full route tree: the contact API at the root, the OpenAPI
/// documents under `/api-docs`, CORS and JSON error mapping around everything.
pub fn build_app(settings: &Settings, handler: Arc<ContactHandler>) -> impl Endpoint {
    let api_service = create_openapi_service(handler)
        .description(DESCRIPTION)
        .summary("Relays website contact form submissions by email");

    let swagger = api_service.swagger_ui();
    let spec_json = api_service.spec_endpoint();

    let open_api_route = Route::new()
        .nest("/", api_service)
        .with(ErrorCapture)
        .with(Tracing);

    let cors = if settings.cors_origins.is_empty() {
        Cors::new()
    } else {
        Cors::new().allow_origins(settings.cors_origins.clone())
    };

    Route::new()
        .nest("/api-docs/swagger", swagger)
        .nest("/api-docs/spec.json", spec_json)
        .nest("/", open_api_route)
        .with(cors)
        .with(CatchPanic::new())
        .catch_all_error(error_handler)
}

pub async fn start_http_server(
    settings: &Settings,
    handler: Arc<ContactHandler>,
) -> ContactRelayResult<()> {
    let listener = TcpListener::bind((settings.bind_ip.clone(), settings.port));

    let server = Server::new(listener)
        .name("Contact Relay API Service")
        .idle_timeout(Duration::from_secs(60))
        .run_with_graceful_shutdown(
            build_app(settings, handler),
            shutdown_signal(),
            Some(Duration::from_secs(5)),
        );
    info!(
        "Contact Relay API Service is now running on {}:{}.",
        settings.bind_ip, settings.port
    );
    server
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
}
