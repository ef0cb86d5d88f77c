//! Email service for account emails (verification and password reset).
//!
//! Uses `lettre` for SMTP transport. When delivery is disabled the links are
//! written to the log instead, which is how local development receives them.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use tracing::info;

use crate::config::EmailConfig;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for sending account emails.
#[derive(Debug, Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| EmailError::SendError(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();

        Ok(transport)
    }

    /// Builds the link a verification email points at.
    #[must_use]
    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/verify?token={token}", self.config.frontend_url)
    }

    /// Builds the link a password reset email points at.
    #[must_use]
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={token}", self.config.frontend_url)
    }

    /// Sends an email verification email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_verification_email(
        &self,
        to_email: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let link = self.verification_link(token);
        let body = format!(
            r"Hi,

Please confirm your email address for Glimpse by opening the link below:

{link}

The link expires in one hour. If you did not sign up, ignore this email."
        );

        self.send_email(to_email, "Verify your email address", &body)
            .await
    }

    /// Sends a password reset email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let link = self.reset_link(token);
        let body = format!(
            r"Hi,

Someone asked to reset the password of your Glimpse account. Open the link
below to choose a new one:

{link}

The link expires in one hour. If it was not you, ignore this email."
        );

        self.send_email(to_email, "Reset your password", &body).await
    }

    /// Sends a plain-text email, or logs it when delivery is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be built or sent.
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        if !self.config.enabled {
            info!(to = %to_email, subject, body, "Email delivery disabled");
            return Ok(());
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EmailError::BuildError(e.to_string()))?;

        self.create_transport()?
            .send(email)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        Ok(())
    }
}
