use super::{ClientError, ContactClient, Reply};
use crate::contact::submission::ContactFields;

/// Where the contact form is in its lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormState {
    /// Accepting input. `notice` explains why the last attempt didn't go through.
    Idle { notice: Option<String> },
    /// A request is in flight; the submit control is disabled.
    Sending,
    /// The relay accepted the message; the confirmation view is shown.
    Sent,
}

/// Contact form state machine: `Idle -> Sending -> Sent`, or back to `Idle` on failure.
#[derive(Debug)]
pub struct ContactForm {
    state: FormState,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self { state: FormState::Idle { notice: None } }
    }
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn submit_enabled(&self) -> bool {
        matches!(self.state, FormState::Idle { .. })
    }

    pub fn submit_label(&self) -> &'static str {
        match self.state {
            FormState::Sending => "Sending...",
            _ => "Send Message",
        }
    }

    /// Move into `Sending`. Returns false, leaving the state alone, if the form can't submit right
    /// now or a field is blank.
    pub fn begin(&mut self, fields: &ContactFields) -> bool {
        if !self.submit_enabled() {
            return false;
        }
        if !fields.is_complete() {
            self.state = FormState::Idle { notice: Some("All fields are required".into()) };
            return false;
        }
        self.state = FormState::Sending;
        true
    }

    /// Apply the outcome of the request started by [`ContactForm::begin`].
    pub fn settle(&mut self, outcome: &Result<Reply, ClientError>) {
        if self.state != FormState::Sending {
            return;
        }
        self.state = match outcome {
            Ok(_) => FormState::Sent,
            Err(e) => {
                tracing::warn!("contact form failed: {e}");
                FormState::Idle { notice: Some(e.notice()) }
            }
        };
    }

    /// "Send Another Message": back to an empty idle form.
    pub fn reset(&mut self) {
        if self.state == FormState::Sent {
            self.state = FormState::Idle { notice: None };
        }
    }

    /// Run one full submission against `client`. Returns the state the form ends up in.
    pub async fn submit(&mut self, client: &ContactClient, fields: &ContactFields) -> &FormState {
        if self.begin(fields) {
            tracing::debug!(label = self.submit_label(), "submitting contact form");
            let outcome = client.submit(fields).await;
            self.settle(&outcome);
        }
        &self.state
    }
}
