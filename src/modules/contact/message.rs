// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Cow;

use mail_send::mail_builder::{headers::address::Address, MessageBuilder};

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Addr {
    /// Optional display name (e.g., "John Doe").
    pub name: Option<String>,
    pub address: String,
}

impl Addr {
    pub fn new(name: Option<String>, address: impl Into<String>) -> Self {
        Self {
            name,
            address: address.into(),
        }
    }
}

impl std::fmt::Display for Addr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "\"{}\" <{}>", name, self.address),
            None => write!(f, "<{}>", self.address),
        }
    }
}

impl From<&Addr> for Address<'static> {
    fn from(addr: &Addr) -> Self {
        Address::new_address(
            addr.name.clone().map(Cow::Owned),
            Cow::Owned(addr.address.clone()),
        )
    }
}

/// A fully rendered outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: Addr,
    pub to: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl MailMessage {
    /// Builds the MIME message, stamping it with `message_id`.
    pub fn to_builder(&self, message_id: &str) -> MessageBuilder<'static> {
        let to = match self.to.as_slice() {
            [single] => Address::from(single.clone()),
            many => Address::new_list(many.iter().cloned().map(Address::from).collect()),
        };

        let mut builder = MessageBuilder::new()
            .from(Address::from(&self.from))
            .to(to)
            .subject(self.subject.clone())
            .text_body(self.text.clone())
            .html_body(self.html.clone())
            .message_id(message_id.to_string());

        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(Address::from(reply_to.clone()));
        }
        builder
    }
}

/// Escapes `text` for HTML and turns each line break into `<br>`.
pub fn html_with_line_breaks(text: &str) -> String {
    handlebars::html_escape(text)
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_become_br() {
        assert_eq!(html_with_line_breaks("line1\nline2"), "line1<br>line2");
        assert_eq!(html_with_line_breaks("a\r\nb\n\nc"), "a<br>b<br><br>c");
    }

    #[test]
    fn markup_in_user_text_is_escaped() {
        assert_eq!(
            html_with_line_breaks("<b>hi</b>\nthere"),
            "&lt;b&gt;hi&lt;/b&gt;<br>there"
        );
    }

    #[test]
    fn addr_display_quotes_name() {
        let addr = Addr::new(Some("Alice".into()), "relay@example.com");
        assert_eq!(addr.to_string(), "\"Alice\" <relay@example.com>");
        assert_eq!(Addr::new(None, "x@y.z").to_string(), "<x@y.z>");
    }
}
