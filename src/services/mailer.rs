// src/services/mailer.rs
// DOCUMENTATION: Outgoing account email
// PURPOSE: Send verification links through an HTTP mail API, or log them in development

use crate::config::Config;
use crate::errors::HubError;
use reqwest::Client;
use serde::Serialize;

/// Payload posted to the mail API
#[derive(Debug, Serialize)]
struct MailMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: String,
}

/// Mail sender
/// DOCUMENTATION: With no MAIL_API_URL configured, messages are written to the log only
#[derive(Clone)]
pub struct Mailer {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
    public_base_url: String,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_url: config.mail_api_url.clone(),
            api_key: config.mail_api_key.clone(),
            from: config.mail_from.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_url.is_empty()
    }

    /// Link the user follows to verify their address
    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/api/auth/verify-email?token={}", self.public_base_url, token)
    }

    pub async fn send_verification(
        &self,
        to: &str,
        username: &str,
        token: &str,
    ) -> Result<(), HubError> {
        let link = self.verification_link(token);
        let text = format!(
            "Hi {},\n\nWelcome! Confirm your email address by opening the link below:\n\n{}\n\nIf you did not create an account, you can ignore this message.\n",
            username, link
        );

        self.send(to, "Verify your email address", text).await
    }

    async fn send(&self, to: &str, subject: &str, text: String) -> Result<(), HubError> {
        if !self.is_configured() {
            log::info!("Mail to {} ({}):\n{}", to, subject, text);
            return Ok(());
        }

        let message = MailMessage {
            from: &self.from,
            to,
            subject,
            text,
        };

        let mut request = self.client.post(&self.api_url).json(&message);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await.map_err(|e| {
            log::error!("Mail API request failed: {}", e);
            HubError::ExternalApiError(format!("Request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Mail API error {}: {}", status, body);
            return Err(HubError::ExternalApiError(format!(
                "Mail API error {}",
                status
            )));
        }

        log::info!("Sent \"{}\" to {}", subject, to);
        Ok(())
    }
}
