//! Dual-send contact relay: notify the owner, then acknowledge the submitter.

use std::fmt;

use lettre::message::{Mailbox, MultiPart};
use lettre::Message;

use crate::contact::submission::ContactSubmission;
use crate::prelude::*;
use crate::utils::emailer::Emailer;
use crate::views::contact::{AcknowledgmentEmail, NotificationEmail};

/// Where in the relay a fault happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayStage {
    /// Rendering templates or building messages. Nothing was sent.
    Compose,
    /// Sending the owner notification. Nothing was delivered.
    Notification,
    /// Sending the submitter acknowledgment. The owner was already notified.
    Acknowledgment,
}

impl RelayStage {
    /// Short client-facing description.
    pub fn describe(self) -> &'static str {
        match self {
            RelayStage::Compose => "message could not be prepared",
            RelayStage::Notification => "message could not be delivered",
            RelayStage::Acknowledgment => "confirmation could not be delivered",
        }
    }
}

impl fmt::Display for RelayStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelayStage::Compose => "composing emails",
            RelayStage::Notification => "sending notification",
            RelayStage::Acknowledgment => "sending acknowledgment",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{stage}: {cause:#}")]
pub struct RelayError {
    pub stage: RelayStage,
    pub cause: anyhow::Error,
}

impl RelayError {
    pub fn new(stage: RelayStage, cause: impl Into<anyhow::Error>) -> Self {
        Self { stage, cause: cause.into() }
    }

    pub fn owner_notified(&self) -> bool {
        self.stage == RelayStage::Acknowledgment
    }
}

/// Both messages for one submission, ready to send.
pub struct Composed {
    pub notification: Message,
    pub acknowledgment: Message,
}

/// Relays contact submissions through an [`Emailer`].
#[derive(Clone)]
pub struct Relay {
    emailer: Emailer,
    inbox: Mailbox,
    site_name: String,
}

impl Relay {
    pub fn new(emailer: Emailer, inbox: Mailbox, site_name: impl Into<String>) -> Self {
        Self { emailer, inbox, site_name: site_name.into() }
    }

    /// Render and build both messages.
    pub fn compose(&self, submission: &ContactSubmission) -> Result<Composed, RelayError> {
        let compose = |e: anyhow::Error| RelayError::new(RelayStage::Compose, e);

        let subject = submission.subject_line();
        let email = submission.email.to_string();

        let html = NotificationEmail {
            site_name: &self.site_name,
            name: &submission.name,
            email: &email,
            message: &submission.message,
        }
        .render()
        .map_err(|e| compose(e.into()))?;
        let notification = self
            .emailer
            .builder()
            .to(self.inbox.clone())
            .reply_to(Mailbox::new(Some(submission.name.clone()), submission.email.clone()))
            .subject(subject.clone())
            .multipart(MultiPart::alternative_plain_html(submission.message.clone(), html))
            .map_err(|e| compose(e.into()))?;

        let html = AcknowledgmentEmail {
            site_name: &self.site_name,
            name: &submission.name,
            message: &submission.message,
        }
        .render()
        .map_err(|e| compose(e.into()))?;
        let acknowledgment = self
            .emailer
            .builder()
            .to(Mailbox::new(None, submission.email.clone()))
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(submission.message.clone(), html))
            .map_err(|e| compose(e.into()))?;

        Ok(Composed { notification, acknowledgment })
    }

    /// Send the notification, then the acknowledgment. Stops at the first fault.
    #[tracing::instrument(skip_all, fields(to = %submission.email))]
    pub async fn relay(&self, submission: &ContactSubmission) -> Result<(), RelayError> {
        let Composed { notification, acknowledgment } = self.compose(submission)?;

        tracing::debug!("notifying owner");
        self.emailer
            .send(notification)
            .await
            .map_err(|e| RelayError::new(RelayStage::Notification, e))?;

        tracing::debug!("acknowledging submitter");
        self.emailer
            .send(acknowledgment)
            .await
            .map_err(|e| RelayError::new(RelayStage::Acknowledgment, e))?;

        tracing::info!("contact submission relayed");
        Ok(())
    }
}
