// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use clap::{builder::ValueParser, ArgAction, Parser};
use std::collections::HashSet;

#[derive(Debug, Clone, Parser)]
#[clap(
    name = "contact-relay",
    about = "Relays website contact-form submissions to an administrator and back to the sender over SMTP.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    #[clap(
        long,
        default_value = "info",
        env = "LOG_LEVEL",
        help = "Set the log level (error, warn, info, debug, trace)"
    )]
    pub log_level: String,

    #[clap(
        long,
        default_value = "true",
        env = "ANSI_LOGS",
        action = ArgAction::Set,
        help = "Enable ANSI formatted logs"
    )]
    pub ansi_logs: bool,

    #[clap(
        long,
        default_value = "false",
        env = "JSON_LOGS",
        action = ArgAction::Set,
        help = "Enable JSON formatted logs"
    )]
    pub json_logs: bool,

    #[clap(long, default_value = "3000", env = "PORT", help = "Set the HTTP port")]
    pub port: u16,

    #[clap(
        long,
        env = "BIND_IP",
        default_value = "0.0.0.0",
        help = "The IPv4 address the HTTP server binds to",
        value_parser = ValueParser::new(|s: &str| {
            if s.parse::<std::net::Ipv4Addr>().is_err() {
                return Err("The bind IP address must be a valid IPv4 address.".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub bind_ip: String,

    #[clap(
        long,
        default_value = "",
        env = "CORS_ORIGINS",
        help = "Allowed CORS origins (comma-separated). Empty allows any origin",
        value_parser = ValueParser::new(|s: &str| -> Result<HashSet<String>, String> {
            Ok(split_list(s).into_iter().collect())
        })
    )]
    pub cors_origins: HashSet<String>,

    #[clap(
        long,
        default_value = "smtp.gmail.com",
        env = "EMAIL_HOST",
        help = "Hostname of the SMTP relay"
    )]
    pub email_host: String,

    #[clap(
        long,
        default_value = "587",
        env = "EMAIL_PORT",
        help = "Port of the SMTP relay"
    )]
    pub email_port: u16,

    /// Only the literal `true` enables implicit TLS; every other value leaves it off.
    #[clap(
        long,
        default_value = "false",
        env = "EMAIL_SECURE",
        action = ArgAction::Set,
        help = "Use implicit TLS when connecting to the SMTP relay (usually port 465)",
        value_parser = ValueParser::new(|s: &str| -> Result<bool, String> { Ok(s == "true") })
    )]
    pub email_secure: bool,

    #[clap(
        long,
        env = "EMAIL_USER",
        help = "SMTP username, also used as the sender address"
    )]
    pub email_user: Option<String>,

    #[clap(
        long,
        env = "EMAIL_PASS",
        hide_env_values = true,
        help = "SMTP password"
    )]
    pub email_pass: Option<String>,

    #[clap(
        long,
        env = "ADMIN_EMAIL",
        help = "Administrator address(es) receiving submissions (comma-separated)"
    )]
    pub admin_email: Option<String>,

    #[clap(
        long,
        default_value = "Your Website Name",
        env = "SENDER_NAME",
        help = "Display name used on confirmation emails"
    )]
    pub sender_name: String,

    #[clap(
        long,
        default_value = "Your Website Team",
        env = "TEAM_SIGNATURE",
        help = "Signature line closing confirmation emails"
    )]
    pub team_signature: String,

    #[clap(
        long,
        default_value = "30",
        env = "SMTP_TIMEOUT_SECS",
        help = "Timeout in seconds for connecting to and talking with the SMTP relay",
        value_parser = clap::value_parser!(u64).range(1..=600)
    )]
    pub smtp_timeout_secs: u64,

    #[clap(
        long,
        default_value = "10",
        env = "SMTP_POOL_SIZE",
        help = "Maximum number of pooled SMTP connections",
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    pub smtp_pool_size: u32,
}

impl Settings {
    /// Admin recipients parsed from `ADMIN_EMAIL`; empty when unset.
    pub fn admin_recipients(&self) -> Vec<String> {
        self.admin_email
            .as_deref()
            .map(split_list)
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub fn new_for_test() -> Self {
        Self {
            log_level: "info".to_string(),
            ansi_logs: false,
            json_logs: false,
            port: 3000,
            bind_ip: "127.0.0.1".to_string(),
            cors_origins: HashSet::new(),
            email_host: "localhost".to_string(),
            email_port: 2525,
            email_secure: false,
            email_user: Some("relay@example.com".to_string()),
            email_pass: Some("secret".to_string()),
            admin_email: Some("admin@example.com".to_string()),
            sender_name: "Your Website Name".to_string(),
            team_signature: "Your Website Team".to_string(),
            smtp_timeout_secs: 30,
            smtp_pool_size: 10,
        }
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
