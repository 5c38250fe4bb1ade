use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use lettre::message::{Mailbox, MessageBuilder};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::utils::config::{EmailConfig, Security};

/// Something that can hand a fully built message to a mail server.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: Message) -> anyhow::Result<()>;
}

/// Pooled async SMTP transport.
pub struct Smtp(AsyncSmtpTransport<Tokio1Executor>);

#[async_trait]
impl MailTransport for Smtp {
    async fn send(&self, message: Message) -> anyhow::Result<()> {
        let response = self.0.send(message).await?;
        tracing::debug!(code = %response.code(), "smtp accepted message");
        Ok(())
    }
}

impl Smtp {
    pub fn new(config: &EmailConfig) -> anyhow::Result<Self> {
        // `lettre` requires a default provider to be installed to use SMTPS.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let mut transport = match (&config.smtp_addr, config.service) {
            (Some(addr), _) => AsyncSmtpTransport::<Tokio1Executor>::from_url(addr)
                .with_context(|| format!("parsing smtp_addr={addr}"))?,
            (None, Some(service)) => {
                let (host, port, security) = service.relay();
                let builder = match security {
                    Security::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
                    Security::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
                };
                builder.port(port)
            }
            (None, None) => anyhow::bail!("one of email.smtp_addr or email.service must be set"),
        };
        if let Some(password) = &config.smtp_password {
            transport = transport.credentials(Credentials::new(config.username(), password.clone()));
        }
        if let Some(secs) = config.timeout_secs {
            transport = transport.timeout(Some(Duration::from_secs(secs)));
        }

        Ok(Self(transport.build()))
    }
}

/// Email client.
#[derive(Clone)]
pub struct Emailer {
    /// Mailbox to send email from.
    from: Mailbox,
    /// Underlying transport.
    transport: Arc<dyn MailTransport>,
}

impl Emailer {
    /// Build an SMTP backed emailer from config.
    pub fn connect(config: &EmailConfig) -> anyhow::Result<Self> {
        let transport = Smtp::new(config)?;
        match (&config.smtp_addr, config.service) {
            // The URL may embed credentials.
            (Some(_), _) => tracing::info!("email via smtp url"),
            (None, Some(service)) => tracing::info!(%service, "email via preset relay"),
            (None, None) => {}
        }
        Ok(Self::with_transport(config.from.clone(), Arc::new(transport)))
    }

    pub fn with_transport(from: Mailbox, transport: Arc<dyn MailTransport>) -> Self {
        Self { from, transport }
    }

    pub fn builder(&self) -> MessageBuilder {
        Message::builder().from(self.from.clone())
    }

    pub async fn send(&self, message: Message) -> anyhow::Result<()> {
        self.transport.send(message).await
    }
}

/// In-memory transport which records every message and can be told to fail.
#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct RecordingTransport {
        sent: Mutex<Vec<Message>>,
        attempts: Mutex<usize>,
        /// Zero-based index of the send attempt that should fail.
        fail_on: Option<usize>,
    }

    impl RecordingTransport {
        pub fn failing_on(attempt: usize) -> Self {
            Self { fail_on: Some(attempt), ..Default::default() }
        }

        /// Messages that were delivered, in order.
        pub fn sent(&self) -> Vec<Message> {
            self.sent.lock().unwrap().clone()
        }

        pub fn attempts(&self) -> usize {
            *self.attempts.lock().unwrap()
        }

        /// The `To` address and subject header of every delivered message.
        pub fn summary(&self) -> Vec<(String, String)> {
            self.sent()
                .iter()
                .map(|m| {
                    let to = m.envelope().to().iter().map(|a| a.to_string()).collect::<Vec<_>>().join(",");
                    let subject = m.headers().get_raw("Subject").unwrap_or_default().to_string();
                    (to, subject)
                })
                .collect()
        }
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, message: Message) -> anyhow::Result<()> {
            let attempt = {
                let mut attempts = self.attempts.lock().unwrap();
                *attempts += 1;
                *attempts - 1
            };
            if self.fail_on == Some(attempt) {
                anyhow::bail!("550 mailbox unavailable (attempt {attempt})");
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }
}
