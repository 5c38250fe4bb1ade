mod app;
mod client;
mod contact;
mod prelude;
mod utils;
mod views;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use axum_server::tls_rustls::RustlsConfig;
use clap::{Parser, Subcommand};
use tracing::{level_filters::LevelFilter, Level};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use crate::client::{ContactClient, ContactForm, FormState};
use crate::contact::submission::ContactFields;
use crate::utils::config::Config;
use crate::utils::emailer::Emailer;

#[derive(Parser)]
#[command(about = "Portfolio contact form relay")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the contact page and the mail relay endpoint.
    Serve {
        /// Path to the TOML config file.
        config: PathBuf,
    },
    /// Submit the contact form once against a running relay.
    Send {
        /// Relay endpoint, e.g. `https://site.com/api/sendMail`.
        #[arg(long, default_value = "http://localhost:3000/api/sendMail")]
        endpoint: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
        /// Give up after this many seconds. Waits indefinitely when unset.
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_filter = tracing_subscriber::filter::Targets::default()
        .with_target("h2", LevelFilter::OFF)
        .with_target("hyper_util", LevelFilter::INFO)
        .with_target("rustls", LevelFilter::OFF)
        .with_default(Level::DEBUG);

    tracing_subscriber::fmt()
        .pretty()
        .with_target(true)
        .with_line_number(true)
        .with_max_level(Level::DEBUG)
        .finish()
        .with(log_filter)
        .try_init()?;

    match Cli::parse().command {
        Command::Serve { config } => serve(config).await,
        Command::Send { endpoint, name, email, subject, message, timeout } => {
            let client = match timeout {
                Some(secs) => ContactClient::with_timeout(endpoint, Duration::from_secs(secs))?,
                None => ContactClient::new(endpoint),
            };
            let fields = ContactFields { name, email, subject, message };
            let mut form = ContactForm::new();
            form.submit(&client, &fields).await;
            match form.state() {
                FormState::Sent => {
                    println!("Message Sent! Thank you for reaching out.");
                    Ok(())
                }
                FormState::Idle { notice: Some(notice) } => anyhow::bail!("not sent: {notice}"),
                state => anyhow::bail!("not sent: form ended in {state:?}"),
            }
        }
    }
}

async fn serve(file: PathBuf) -> anyhow::Result<()> {
    // Load the server config
    let config = Config::load(&file).await?;
    let emailer = Emailer::connect(&config.email)?;

    let addr = config.net.addr;
    let tls = config.tls.clone();
    let app = app::build(config.clone(), emailer).into_make_service();
    tracing::info!("Live at {}", &config.app.url);

    match tls {
        Some(tls) => {
            let rustls = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .with_context(|| format!("loading tls cert={}", tls.cert.display()))?;
            axum_server::bind_rustls(addr, rustls).serve(app).await?;
        }
        None => axum_server::bind(addr).serve(app).await?,
    }

    Ok(())
}
