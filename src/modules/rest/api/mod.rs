// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use contact::ContactApi;
use poem_openapi::{OpenApiService, Tags};

use crate::modules::contact::handler::ContactHandler;
use crate::relay_version;

pub mod contact;

#[derive(Tags)]
pub enum ApiTags {
    Contact,
}

pub fn create_openapi_service(handler: Arc<ContactHandler>) -> OpenApiService<ContactApi, ()> {
    OpenApiService::new(ContactApi::new(handler), "ContactRelayApi", relay_version!())
}
