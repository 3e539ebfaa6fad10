// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::contact::message::html_with_line_breaks;
use crate::modules::contact::submission::Submission;
use crate::modules::error::code::ErrorCode;
use crate::{modules::error::ContactRelayResult, raise_error};
use handlebars::Handlebars;
use serde_json::{json, Value};

const ADMIN_TEXT: &str = "You have a new message from your website contact form:

Name: {{name}}
Email: {{email}}
Subject: {{subject}}
Message:
{{message}}";

const ADMIN_HTML: &str = "<p>You have a new message from your website contact form:</p>
<ul>
  <li><strong>Name:</strong> {{name}}</li>
  <li><strong>Email:</strong> {{email}}</li>
  <li><strong>Subject:</strong> {{subject}}</li>
</ul>
<p><strong>Message:</strong></p>
<p>{{{message_html}}}</p>";

const USER_TEXT: &str = "Hi {{name}},

Thank you for reaching out! We have received your message and will get back to you shortly if a response is needed.

Your submission:
Subject: {{subject}}
Message:
{{message}}

Best regards,
{{signature}}";

const USER_HTML: &str = "<p>Hi {{name}},</p>
<p>Thank you for reaching out! We have received your message and will get back to you shortly if a response is needed.</p>
<p><strong>Your submission:</strong></p>
<ul>
  <li><strong>Subject:</strong> {{subject}}</li>
</ul>
<p><strong>Message:</strong></p>
<p>{{{message_html}}}</p>
<p>Best regards,<br>{{signature}}</p>";

/// Plain-text and HTML bodies of one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    pub text: String,
    pub html: String,
}

/// Both body templates, compiled once at startup.
///
/// Text templates are rendered without escaping. HTML templates escape every
/// `{{value}}`; the message itself is pre-escaped and carries `<br>` markup, so
/// it is inserted with a triple-stash.
pub struct MailTemplates {
    text: Handlebars<'static>,
    html: Handlebars<'static>,
}

impl MailTemplates {
    pub fn new() -> ContactRelayResult<Self> {
        let mut text = Handlebars::new();
        text.register_escape_fn(handlebars::no_escape);
        let mut html = Handlebars::new();

        let register_template = |hb: &mut Handlebars, name: &str, content: &str| {
            hb.register_template_string(name, content).map_err(|e| {
                raise_error!(
                    format!("Handlebars register '{name}' error: {e}"),
                    ErrorCode::InternalError
                )
            })
        };

        register_template(&mut text, "admin", ADMIN_TEXT)?;
        register_template(&mut text, "user", USER_TEXT)?;
        register_template(&mut html, "admin", ADMIN_HTML)?;
        register_template(&mut html, "user", USER_HTML)?;

        Ok(Self { text, html })
    }

    pub fn admin(&self, submission: &Submission) -> ContactRelayResult<RenderedBody> {
        self.render("admin", &Self::data(submission, None))
    }

    pub fn user(&self, submission: &Submission, signature: &str) -> ContactRelayResult<RenderedBody> {
        self.render("user", &Self::data(submission, Some(signature)))
    }

    fn data(submission: &Submission, signature: Option<&str>) -> Value {
        json!({
            "name": submission.name,
            "email": submission.email,
            "subject": submission.subject_or_placeholder(),
            "message": submission.message,
            "message_html": html_with_line_breaks(&submission.message),
            "signature": signature,
        })
    }

    fn render(&self, name: &str, data: &Value) -> ContactRelayResult<RenderedBody> {
        let render_template = |hb: &Handlebars, kind: &str| {
            hb.render(name, data).map_err(|e| {
                raise_error!(
                    format!("Handlebars '{name}' {kind} render error: {e}"),
                    ErrorCode::InternalError
                )
            })
        };

        Ok(RenderedBody {
            text: render_template(&self.text, "text")?,
            html: render_template(&self.html, "html")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(subject: Option<&str>, message: &str) -> Submission {
        Submission {
            name: "Alice".into(),
            email: "a@x.com".into(),
            subject: subject.map(Into::into),
            message: message.into(),
        }
    }

    #[test]
    fn admin_body_lists_every_field() {
        let templates = MailTemplates::new().unwrap();
        let body = templates
            .admin(&submission(Some("Pricing"), "Hello"))
            .unwrap();
        assert!(body.text.contains("Name: Alice\nEmail: a@x.com\nSubject: Pricing\nMessage:\nHello"));
        assert!(body.html.contains("<li><strong>Name:</strong> Alice</li>"));
        assert!(body.html.contains("<li><strong>Subject:</strong> Pricing</li>"));
    }

    #[test]
    fn missing_subject_renders_placeholder() {
        let templates = MailTemplates::new().unwrap();
        let admin = templates.admin(&submission(None, "Hello")).unwrap();
        assert!(admin.text.contains("Subject: N/A"));
        assert!(admin.html.contains("<strong>Subject:</strong> N/A"));

        let user = templates.user(&submission(None, "Hello"), "Team").unwrap();
        assert!(user.text.contains("Subject: N/A"));
    }

    #[test]
    fn newlines_kept_in_text_and_broken_in_html() {
        let templates = MailTemplates::new().unwrap();
        let body = templates.admin(&submission(None, "line1\nline2")).unwrap();
        assert!(body.text.contains("line1\nline2"));
        assert!(body.html.contains("line1<br>line2"));
    }

    #[test]
    fn text_is_not_escaped_but_html_is() {
        let templates = MailTemplates::new().unwrap();
        let mut input = submission(Some("a < b & c"), "<script>");
        input.name = "O'Neil".into();
        let body = templates.user(&input, "Your Website Team").unwrap();
        assert!(body.text.starts_with("Hi O'Neil,"));
        assert!(body.text.contains("Subject: a < b & c"));
        assert!(body.text.ends_with("Best regards,\nYour Website Team"));
        assert!(!body.html.contains("<script>"));
        assert!(body.html.contains("a &lt; b &amp; c"));
        assert!(body.html.ends_with("<p>Best regards,<br>Your Website Team</p>"));
    }
}
