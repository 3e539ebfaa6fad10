// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem_openapi::Object;
use serde::{Deserialize, Serialize};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Name, email, and message are required.";
pub const SINGLE_LINE_MESSAGE: &str = "Name, email, and subject must not contain line breaks.";

/// Contact form exactly as posted, either as JSON or URL-encoded.
///
/// Every field is optional on the wire so that a missing value is reported by
/// [`ContactForm::validate`] with the documented message instead of a parser error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Object)]
pub struct ContactForm {
    /// Name of the person reaching out.
    pub name: Option<String>,
    /// Address the confirmation is sent to.
    pub email: Option<String>,
    /// Optional subject line. Defaults to "New Contact Form: {name}".
    pub subject: Option<String>,
    /// Free text; line breaks are kept.
    pub message: Option<String>,
}

/// A contact form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

impl ContactForm {
    pub fn validate(self) -> Result<Submission, String> {
        let (Some(name), Some(email), Some(message)) = (
            non_empty(self.name),
            non_empty(self.email),
            non_empty(self.message),
        ) else {
            return Err(REQUIRED_FIELDS_MESSAGE.to_string());
        };
        let subject = non_empty(self.subject);

        // these end up in headers and in the SMTP envelope
        let header_bound = [Some(&name), Some(&email), subject.as_ref()];
        if header_bound
            .into_iter()
            .flatten()
            .any(|value| value.contains(['\r', '\n']))
        {
            return Err(SINGLE_LINE_MESSAGE.to_string());
        }

        Ok(Submission {
            name,
            email,
            subject,
            message,
        })
    }
}

impl Submission {
    /// Subject as shown inside message bodies.
    pub fn subject_or_placeholder(&self) -> &str {
        self.subject.as_deref().unwrap_or("N/A")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, subject: Option<&str>, message: &str) -> ContactForm {
        ContactForm {
            name: Some(name.into()),
            email: Some(email.into()),
            subject: subject.map(Into::into),
            message: Some(message.into()),
        }
    }

    #[test]
    fn accepts_complete_form() {
        let submission = form("Alice", "a@x.com", Some("Hi"), "Hello")
            .validate()
            .unwrap();
        assert_eq!(submission.name, "Alice");
        assert_eq!(submission.subject.as_deref(), Some("Hi"));
        assert_eq!(submission.subject_or_placeholder(), "Hi");
    }

    #[test]
    fn each_required_field_is_enforced() {
        let cases = [
            form("", "a@x.com", None, "Hello"),
            form("Alice", "", None, "Hello"),
            form("Alice", "a@x.com", None, ""),
            ContactForm {
                name: None,
                ..form("Alice", "a@x.com", None, "Hello")
            },
            ContactForm::default(),
        ];
        for case in cases {
            assert_eq!(case.validate().unwrap_err(), REQUIRED_FIELDS_MESSAGE);
        }
    }

    #[test]
    fn empty_subject_counts_as_missing() {
        let submission = form("Alice", "a@x.com", Some(""), "Hello")
            .validate()
            .unwrap();
        assert_eq!(submission.subject, None);
        assert_eq!(submission.subject_or_placeholder(), "N/A");
    }

    #[test]
    fn line_breaks_rejected_in_header_fields() {
        let cases = [
            form("Alice\r\nBcc: victim@evil.com", "a@x.com", None, "Hello"),
            form("Alice", "a@x.com\r\nX-Injected: 1", None, "Hello"),
            form("Alice", "a@x.com>\r\nRCPT TO:<victim@evil.com", None, "Hello"),
            form("Alice", "a@x.com", Some("Hi\r\nX-Subj: 1"), "Hello"),
            form("Alice", "a@x.com", Some("Hi\nBcc: victim@evil.com"), "Hello"),
        ];
        for case in cases {
            assert_eq!(case.validate().unwrap_err(), SINGLE_LINE_MESSAGE);
        }
    }

    #[test]
    fn line_breaks_allowed_in_message() {
        let submission = form("Alice", "a@x.com", None, "line1\r\nline2")
            .validate()
            .unwrap();
        assert_eq!(submission.message, "line1\r\nline2");
    }

    #[test]
    fn whitespace_is_not_treated_as_empty() {
        assert!(form(" ", "a@x.com", None, "Hello").validate().is_ok());
    }
}
