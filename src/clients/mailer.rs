use std::env;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::common::error::{BackendError, Result};

/// Outbound email seam. One message kind today; tests substitute a fake.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, to: &str, otp: i64) -> Result<()>;
}

/// SMTP mailer. Config via env: `EMAIL_HOST`, `EMAIL_PORT`, `EMAIL_SECURE`,
/// `EMAIL_USER`, `EMAIL_PASS`.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_env() -> Result<Self> {
        let host = env::var("EMAIL_HOST")?;
        let port: u16 = env::var("EMAIL_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(587);
        let secure = env::var("EMAIL_SECURE")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let user = env::var("EMAIL_USER")?;
        let pass = env::var("EMAIL_PASS")?;

        let builder = if secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
        }
        .map_err(|e| BackendError::Email {
            message: format!("Failed to configure SMTP transport: {e}"),
        })?;

        let transport = builder
            .port(port)
            .credentials(Credentials::new(user.clone(), pass))
            .build();

        let from = user.parse().map_err(|e| BackendError::Email {
            message: format!("Invalid sender address '{user}': {e}"),
        })?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(&self, to: &str, otp: i64) -> Result<()> {
        let recipient: Mailbox = to.parse().map_err(|e| BackendError::Email {
            message: format!("Invalid recipient address: {e}"),
        })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject("Password Reset")
            .header(ContentType::TEXT_HTML)
            .body(format!(
                "<p>Your OTP for password reset is: <strong>{otp}</strong>. \
                 This OTP is valid for 30 minutes.</p>"
            ))
            .map_err(|e| BackendError::Email {
                message: format!("Failed to build message: {e}"),
            })?;

        self.transport
            .send(message)
            .await
            .map_err(|e| BackendError::Email {
                message: format!("Failed to send email: {e}"),
            })?;

        info!("Sent password reset email to {}", to);
        Ok(())
    }
}
