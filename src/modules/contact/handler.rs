// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::modules::contact::message::{Addr, MailMessage};
use crate::modules::contact::submission::{ContactForm, Submission};
use crate::modules::contact::templates::MailTemplates;
use crate::modules::contact::transport::{MailTransport, TransportError};
use crate::modules::error::ContactRelayResult;
use crate::modules::settings::cli::Settings;

pub const SUCCESS_MESSAGE: &str = "Message sent successfully to admin and user!";
pub const FAILURE_PREFIX: &str = "Failed to send message. Details: ";

/// Who receives what, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactProfile {
    pub admin_recipients: Vec<String>,
    /// Envelope and header sender of both emails.
    pub sender_address: String,
    /// Display name on the confirmation email.
    pub sender_name: String,
    pub team_signature: String,
}

impl From<&Settings> for ContactProfile {
    fn from(settings: &Settings) -> Self {
        Self {
            admin_recipients: settings.admin_recipients(),
            sender_address: settings.email_user.clone().unwrap_or_default(),
            sender_name: settings.sender_name.clone(),
            team_signature: settings.team_signature.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Admin,
    User,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Admin => write!(f, "admin notification"),
            Step::User => write!(f, "user confirmation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Delivered { message_id: String },
    Failed(TransportError),
    /// Not attempted because an earlier step failed.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: Step,
    pub status: StepStatus,
}

/// Per-step results of one dispatch, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub steps: Vec<StepReport>,
}

impl DispatchReport {
    pub fn first_failure(&self) -> Option<(Step, &TransportError)> {
        self.steps.iter().find_map(|report| match &report.status {
            StepStatus::Failed(error) => Some((report.step, error)),
            _ => None,
        })
    }

    pub fn delivered(&self) -> Vec<(Step, &str)> {
        self.steps
            .iter()
            .filter_map(|report| match &report.status {
                StepStatus::Delivered { message_id } => Some((report.step, message_id.as_str())),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { report: DispatchReport },
    ValidationError { message: String },
    TransportError { message: String, report: DispatchReport },
}

pub struct ContactHandler {
    transport: Arc<dyn MailTransport>,
    profile: ContactProfile,
    templates: MailTemplates,
}

impl ContactHandler {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        profile: ContactProfile,
    ) -> ContactRelayResult<Self> {
        Ok(Self {
            transport,
            profile,
            templates: MailTemplates::new()?,
        })
    }

    /// Validates the form, then notifies the admin and confirms to the user.
    ///
    /// `Err` is reserved for internal faults such as a template that fails to
    /// render; every client or relay problem is an [`Outcome`].
    pub async fn submit(&self, form: ContactForm) -> ContactRelayResult<Outcome> {
        let submission = match form.validate() {
            Ok(submission) => submission,
            Err(message) => return Ok(Outcome::ValidationError { message }),
        };

        let admin = self.admin_message(&submission)?;
        let user = self.user_message(&submission)?;
        let report = self.dispatch([(Step::Admin, &admin), (Step::User, &user)]).await;

        match report.first_failure() {
            None => {
                for (step, message_id) in report.delivered() {
                    info!("{} email sent: {}", step, message_id);
                }
                Ok(Outcome::Success { report })
            }
            Some((step, error)) => {
                error!("Error sending {} email: {:?}", step, error);
                if step == Step::User {
                    warn!(
                        "Admin was already notified about the submission from {}, but the confirmation could not be delivered",
                        submission.email
                    );
                }
                let message = format!("{FAILURE_PREFIX}{error}");
                Ok(Outcome::TransportError { message, report })
            }
        }
    }

    /// Runs the steps in order. A step is attempted only if every step before
    /// it was delivered; the rest are reported as skipped.
    pub async fn dispatch<const N: usize>(
        &self,
        steps: [(Step, &MailMessage); N],
    ) -> DispatchReport {
        let mut reports = Vec::with_capacity(N);
        let mut aborted = false;

        for (step, message) in steps {
            let status = if aborted {
                StepStatus::Skipped
            } else {
                self.send_step(step, message).await
            };
            aborted |= matches!(status, StepStatus::Failed(_));
            reports.push(StepReport { step, status });
        }

        DispatchReport { steps: reports }
    }

    pub async fn send_step(&self, step: Step, message: &MailMessage) -> StepStatus {
        match self.transport.send(message).await {
            Ok(message_id) => StepStatus::Delivered { message_id },
            Err(error) => {
                warn!("Sending {} to {:?} failed: {}", step, message.to, error);
                StepStatus::Failed(error)
            }
        }
    }

    pub fn admin_message(&self, submission: &Submission) -> ContactRelayResult<MailMessage> {
        let body = self.templates.admin(submission)?;
        Ok(MailMessage {
            from: Addr::new(
                Some(submission.name.clone()),
                self.profile.sender_address.clone(),
            ),
            to: self.profile.admin_recipients.clone(),
            reply_to: Some(submission.email.clone()),
            subject: submission
                .subject
                .clone()
                .unwrap_or_else(|| format!("New Contact Form: {}", submission.name)),
            text: body.text,
            html: body.html,
        })
    }

    pub fn user_message(&self, submission: &Submission) -> ContactRelayResult<MailMessage> {
        let body = self
            .templates
            .user(submission, &self.profile.team_signature)?;
        Ok(MailMessage {
            from: Addr::new(
                Some(self.profile.sender_name.clone()),
                self.profile.sender_address.clone(),
            ),
            to: vec![submission.email.clone()],
            reply_to: None,
            subject: format!("Thank you for contacting us, {}!", submission.name),
            text: body.text,
            html: body.html,
        })
    }
}
