//! Native rendition of the contact form: posts [`ContactFields`] to a relay endpoint.

use std::time::Duration;

use crate::contact::submission::ContactFields;

mod form;

pub use form::{ContactForm, FormState};

/// The relay's JSON reply, for both success and failure.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct Reply {
    pub message: String,
    /// Which delivery step failed, on a 500.
    pub error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The relay answered with a non-2xx status.
    #[error("{status}: {}", .reply.message)]
    Rejected { status: reqwest::StatusCode, reply: Reply },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Text worth showing next to the form.
    pub fn notice(&self) -> String {
        match self {
            ClientError::Rejected { reply: Reply { message, error: Some(error) }, .. } => {
                format!("{message} ({error})")
            }
            ClientError::Rejected { reply, .. } => reply.message.clone(),
            ClientError::Http(_) => "Could not reach the server. Please try again.".into(),
        }
    }
}

/// HTTP client for one relay endpoint, e.g. `https://site.com/api/sendMail`.
#[derive(Clone, Debug)]
pub struct ContactClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ContactClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), endpoint: endpoint.into() }
    }

    /// Like [`ContactClient::new`], but give up on requests after `timeout`.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint: endpoint.into() })
    }

    /// POST the fields as JSON. One request, no retries.
    pub async fn submit(&self, fields: &ContactFields) -> Result<Reply, ClientError> {
        let response = self.http.post(&self.endpoint).json(fields).send().await?;
        let status = response.status();

        // A body that isn't a relay reply still has to map to something.
        let body = response.text().await?;
        let reply = serde_json::from_str(&body).unwrap_or_else(|_| Reply {
            message: status.canonical_reason().unwrap_or("Request failed").to_string(),
            error: None,
        });

        if status.is_success() {
            Ok(reply)
        } else {
            tracing::warn!(%status, message = %reply.message, "contact form rejected");
            Err(ClientError::Rejected { status, reply })
        }
    }
}
