// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::ContactRelayResult;
use crate::modules::settings::cli::Settings;
use crate::raise_error;
use chrono::Local;
use tracing::Level;
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

pub fn initialize_logging(settings: &Settings) -> ContactRelayResult<()> {
    let level = parse_log_level(&settings.log_level)?;

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(settings.ansi_logs)
        .with_writer(std::io::stdout)
        .with_level(true)
        .with_target(true)
        .with_timer(LocalTimer);

    let installed = if settings.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    installed.map_err(|e| {
        raise_error!(
            format!("Failed to install log subscriber: {}", e),
            ErrorCode::InternalError
        )
    })
}

fn parse_log_level(value: &str) -> ContactRelayResult<Level> {
    value.parse::<Level>().map_err(|_| {
        raise_error!(
            format!(
                "Invalid log level specified. Use one of: error, warn, info, debug, trace. \
                 The log level you currently specified is 'LOG_LEVEL'='{}'",
                value
            ),
            ErrorCode::MissingConfiguration
        )
    })
}

#[cfg(test)]
mod tests {
    use super::parse_log_level;
    use tracing::Level;

    #[test]
    fn accepts_known_levels_case_insensitively() {
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
    }

    #[test]
    fn rejects_unknown_level() {
        let error = parse_log_level("loud").unwrap_err();
        assert!(error.to_string().contains("'LOG_LEVEL'='loud'"));
    }
}
