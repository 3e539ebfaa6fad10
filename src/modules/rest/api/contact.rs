// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use poem::http::StatusCode;
use poem_openapi::payload::{Form, Json};
use poem_openapi::{ApiRequest, Object, OpenApi};

use crate::modules::contact::handler::{ContactHandler, Outcome, SUCCESS_MESSAGE};
use crate::modules::contact::submission::ContactForm;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::{ApiError, ApiErrorResponse};
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;

pub const HEALTH_MESSAGE: &str = "Mail server is up and running!";

/// Contact form submission, either as JSON or as a classic HTML form post.
#[derive(ApiRequest)]
pub enum ContactRequest {
    Json(Json<ContactForm>),
    Form(Form<ContactForm>),
}

impl ContactRequest {
    fn into_form(self) -> ContactForm {
        match self {
            ContactRequest::Json(Json(form)) => form,
            ContactRequest::Form(Form(form)) => form,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct HealthReply {
    pub message: String,
}

#[derive(Debug, Clone, Object)]
pub struct SendEmailReply {
    pub success: bool,
    pub message: String,
}

pub struct ContactApi {
    handler: Arc<ContactHandler>,
}

impl ContactApi {
    pub fn new(handler: Arc<ContactHandler>) -> Self {
        Self { handler }
    }
}

#[OpenApi(tag = "ApiTags::Contact")]
impl ContactApi {
    /// Liveness check.
    #[oai(path = "/", method = "get", operation_id = "health")]
    async fn health(&self) -> Json<HealthReply> {
        Json(HealthReply {
            message: HEALTH_MESSAGE.into(),
        })
    }

    /// Accepts a contact form submission.
    ///
    /// Notifies the site admin first, then sends a confirmation to the
    /// submitter. The request succeeds only when both emails were accepted
    /// by the relay.
    #[oai(path = "/send-email", method = "post", operation_id = "send_email")]
    async fn send_email(
        &self,
        /// `name`, `email` and `message` are required; `subject` is optional
        request: ContactRequest,
    ) -> ApiResult<Json<SendEmailReply>> {
        match self.handler.submit(request.into_form()).await? {
            Outcome::Success { .. } => Ok(Json(SendEmailReply {
                success: true,
                message: SUCCESS_MESSAGE.into(),
            })),
            Outcome::ValidationError { message } => Err(ApiErrorResponse::Generic(
                ErrorCode::InvalidParameter.status(),
                Json(ApiError::new(message)),
            )),
            Outcome::TransportError { message, .. } => Err(ApiErrorResponse::Generic(
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(message)),
            )),
        }
    }
}
