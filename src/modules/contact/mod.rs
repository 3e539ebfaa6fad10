// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod handler;
pub mod message;
pub mod submission;
pub mod templates;
pub mod transport;
