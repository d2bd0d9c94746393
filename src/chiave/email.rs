//! Outbound delivery of verification codes.
//!
//! The lifecycle only sees the [`MessageSender`] seam. The default
//! sender for local dev is [`LogMailer`], which logs the link and
//! returns `Ok(())`; with `--mail-url` set, [`HttpMailer`] posts the
//! payload to a mail relay instead.

use crate::auth::MessageSender;
use crate::chiave::APP_USER_AGENT;
use crate::cli::globals::GlobalArgs;
use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde_json::json;
use tracing::info;

/// Build the link included in outbound verification messages.
#[must_use]
pub fn build_verify_url(base_url: &str, code: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/auth/verify-link?code={code}")
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogMailer {
    base_url: String,
}

impl LogMailer {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }
}

impl MessageSender for LogMailer {
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<()> {
        info!(
            to_email = %email,
            verify_url = %build_verify_url(&self.base_url, code),
            "verification mail send stub"
        );
        Ok(())
    }
}

/// Delivers codes through an HTTP mail relay.
#[derive(Clone, Debug)]
pub struct HttpMailer {
    client: Client,
    relay_url: String,
    base_url: String,
}

impl HttpMailer {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(relay_url: String, base_url: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("failed to build mail relay client")?;

        Ok(Self {
            client,
            relay_url,
            base_url,
        })
    }
}

impl MessageSender for HttpMailer {
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<()> {
        let payload = json!({
            "to": email,
            "template": "verify_email",
            "code": code,
            "verify_url": build_verify_url(&self.base_url, code),
        });

        let response = self
            .client
            .post(&self.relay_url)
            .json(&payload)
            .send()
            .await
            .context("failed to reach mail relay")?;

        if !response.status().is_success() {
            bail!("mail relay returned {}", response.status());
        }

        Ok(())
    }
}

/// Sender selected at startup from the configuration.
#[derive(Clone, Debug)]
pub enum Mailer {
    Log(LogMailer),
    Http(HttpMailer),
}

impl Mailer {
    /// # Errors
    ///
    /// Returns an error if the relay client cannot be built.
    pub fn from_globals(globals: &GlobalArgs) -> Result<Self> {
        match &globals.mail_url {
            Some(relay_url) => Ok(Self::Http(HttpMailer::new(
                relay_url.clone(),
                globals.base_url.clone(),
            )?)),
            None => Ok(Self::Log(LogMailer::new(globals.base_url.clone()))),
        }
    }
}

impl MessageSender for Mailer {
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<()> {
        match self {
            Self::Log(mailer) => mailer.send_verification_code(email, code).await,
            Self::Http(mailer) => mailer.send_verification_code(email, code).await,
        }
    }
}
