use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;
use lettre::message::Mailbox;

impl Config {
    /// Load a `.toml` file from disk, parse it as a [`Config`], and apply environment overrides.
    pub async fn load(file: &Path) -> anyhow::Result<Config> {
        async fn load_inner(file: &Path) -> anyhow::Result<Config> {
            let contents = tokio::fs::read_to_string(file).await?;
            let mut config: Config = toml::from_str(&contents)?;
            config.email.apply_env(|key| std::env::var(key).ok())?;
            Ok(config)
        }
        load_inner(file).await.with_context(|| format!("loading config={}", file.display()))
    }
}

/// Bag of app configuration values, parsed from a TOML file with serde.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub net: NetConfig,
    pub tls: Option<TlsConfig>,
    pub email: EmailConfig,
}

/// Webapp configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct AppConfig {
    /// Site name shown on the contact page and in outgoing mail, e.g. `Deepath Portfolio`.
    pub name: String,
    /// Public facing URL, e.g. `https://site.com`.
    pub url: String,
}

/// Networking configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct NetConfig {
    /// HTTP(S) server bind address.
    pub addr: SocketAddr,
}

/// Static TLS certificate configuration. Without it the server speaks plain HTTP.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct TlsConfig {
    /// PEM encoded certificate chain.
    pub cert: PathBuf,
    /// PEM encoded private key.
    pub key: PathBuf,
}

/// Email configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct EmailConfig {
    /// Named transport preset, e.g. `gmail`.
    pub service: Option<MailService>,
    /// SMTP address, starting with `smtp://` or `smtps://`. Takes precedence over `service`.
    pub smtp_addr: Option<String>,
    /// SMTP username. Defaults to the `from` address.
    pub smtp_username: Option<String>,
    /// SMTP password.
    pub smtp_password: Option<String>,
    /// Owner mailbox. Every email is sent from it, and submitters may not claim it.
    pub from: Mailbox,
    /// Mailbox receiving contact form notifications. Defaults to `from`.
    pub contact_to: Option<Mailbox>,
    /// Per-command SMTP timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl EmailConfig {
    /// Override credentials and service from `EMAIL_SERVICE`, `EMAIL_USER` and `EMAIL_PASS`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(service) = var("EMAIL_SERVICE") {
            self.service = Some(service.parse().context("EMAIL_SERVICE")?);
        }
        if let Some(user) = var("EMAIL_USER") {
            self.smtp_username = Some(user);
        }
        if let Some(pass) = var("EMAIL_PASS") {
            self.smtp_password = Some(pass);
        }
        Ok(())
    }

    /// Address that contact form submissions are delivered to.
    pub fn inbox(&self) -> &Mailbox {
        self.contact_to.as_ref().unwrap_or(&self.from)
    }

    pub fn username(&self) -> String {
        self.smtp_username.clone().unwrap_or_else(|| self.from.email.to_string())
    }

    /// Addresses a submitter may not claim: the sender and the SMTP login.
    pub fn owner_addresses(&self) -> Vec<String> {
        let mut owners = vec![self.from.email.to_string()];
        let username = self.username();
        if !owners.iter().any(|o| o.eq_ignore_ascii_case(&username)) {
            owners.push(username);
        }
        owners
    }
}

/// How a preset SMTP relay expects the connection to be secured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Security {
    /// TLS from the first byte, usually port 465.
    Tls,
    /// Plaintext upgraded with `STARTTLS`, usually port 587.
    StartTls,
}

/// Well-known mail providers, so a deployment can name a service instead of an SMTP URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum MailService {
    Gmail,
    Yahoo,
    Zoho,
    Outlook365,
    Hotmail,
    ICloud,
    SendGrid,
}

impl MailService {
    /// Relay host, port, and connection security for the preset.
    pub fn relay(self) -> (&'static str, u16, Security) {
        match self {
            MailService::Gmail => ("smtp.gmail.com", 465, Security::Tls),
            MailService::Yahoo => ("smtp.mail.yahoo.com", 465, Security::Tls),
            MailService::Zoho => ("smtp.zoho.com", 465, Security::Tls),
            MailService::Outlook365 => ("smtp.office365.com", 587, Security::StartTls),
            MailService::Hotmail => ("smtp-mail.outlook.com", 587, Security::StartTls),
            MailService::ICloud => ("smtp.mail.me.com", 587, Security::StartTls),
            MailService::SendGrid => ("smtp.sendgrid.net", 587, Security::StartTls),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown mail service `{0}`")]
pub struct UnknownService(String);

impl FromStr for MailService {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Presets are matched loosely: "Outlook 365", "outlook-365" and "outlook365" are the same.
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Ok(match key.as_str() {
            "gmail" | "googlemail" => MailService::Gmail,
            "yahoo" => MailService::Yahoo,
            "zoho" => MailService::Zoho,
            "outlook365" | "office365" => MailService::Outlook365,
            "hotmail" | "outlook" => MailService::Hotmail,
            "icloud" | "me" => MailService::ICloud,
            "sendgrid" => MailService::SendGrid,
            _ => return Err(UnknownService(s.to_string())),
        })
    }
}

impl TryFrom<String> for MailService {
    type Error = UnknownService;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for MailService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (host, port, _) = self.relay();
        write!(f, "{host}:{port}")
    }
}

#[cfg(test)]
impl Config {
    /// Fixture config with `owner@site.test` as the owner address.
    pub fn fixture() -> Self {
        toml::from_str(
            r#"
            [app]
            name = "Test Portfolio"
            url = "http://localhost:3000"

            [net]
            addr = "127.0.0.1:3000"

            [email]
            service = "gmail"
            smtp_password = "hunter2"
            from = "Site Owner <owner@site.test>"
            contact_to = "inbox@site.test"
            "#,
        )
        .expect("fixture config parses")
    }
}
