use devcamper_config::EmailConfig;
use devcamper_core::BoxFuture;
use lettre::message::{Mailbox, MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build email: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("mail task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Sends account mail. Object safe so tests can record or fail deliveries.
pub trait Mailer: Send + Sync {
    fn send_password_reset<'a>(
        &'a self,
        to_email: &'a str,
        to_name: &'a str,
        reset_url: &'a str,
    ) -> BoxFuture<'a, Result<(), MailError>>;
}

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, text_body, html_body))]
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<(), MailError> {
        if !self.config.enabled {
            tracing::info!(to = %to_email, subject, "SMTP disabled, email not sent");
            tracing::debug!(body = %text_body, "Email body");
            return Ok(());
        }

        let from = Mailbox::new(
            Some(self.config.from_name.clone()),
            self.config.from_email.parse()?,
        );

        let email = Message::builder()
            .from(from)
            .to(to_email.parse()?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        let response = tokio::task::spawn_blocking(move || mailer.send(&email)).await??;
        tracing::info!(to = %to_email, code = %response.code(), "Email sent");

        Ok(())
    }
}

impl Mailer for EmailService {
    fn send_password_reset<'a>(
        &'a self,
        to_email: &'a str,
        to_name: &'a str,
        reset_url: &'a str,
    ) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            let text_body = format!(
                "Hi {},\n\n\
                 You are receiving this email because you (or someone else) has requested \
                 the reset of a password.\n\n\
                 Please make a PUT request to:\n\n{}\n\n\
                 The link expires in 10 minutes. If you did not request this, ignore this email.",
                to_name, reset_url
            );

            self.send_email(
                to_email,
                "Password reset token",
                text_body,
                password_reset_template(to_name, reset_url),
            )
            .await
        })
    }
}

fn password_reset_template(name: &str, reset_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Password reset token</title>
</head>
<body style="margin: 0; padding: 20px; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="600" cellpadding="0" cellspacing="0" align="center" style="background-color: #ffffff; border-radius: 8px;">
        <tr>
            <td style="background-color: #343a40; padding: 24px; text-align: center;">
                <h1 style="margin: 0; color: #ffffff; font-size: 26px;">DevCamper</h1>
            </td>
        </tr>
        <tr>
            <td style="padding: 32px 28px; color: #555555; font-size: 15px; line-height: 1.5;">
                <p>Hi <strong>{}</strong>,</p>
                <p>You are receiving this email because you (or someone else) has requested the reset of a password.</p>
                <p>Please make a PUT request to:</p>
                <p style="word-break: break-all; color: #1e7e34;">{}</p>
                <p><strong>This link expires in 10 minutes.</strong></p>
            </td>
        </tr>
    </table>
</body>
</html>"#,
        name, reset_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_config() -> EmailConfig {
        EmailConfig {
            enabled: false,
            smtp_host: "localhost".into(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@devcamper.io".into(),
            from_name: "DevCamper".into(),
        }
    }

    #[test]
    fn test_template_includes_name_and_url() {
        let html = password_reset_template("Jane", "http://localhost:5000/reset/abc");
        assert!(html.contains("Jane"));
        assert!(html.contains("http://localhost:5000/reset/abc"));
    }

    #[tokio::test]
    async fn test_disabled_mailer_succeeds_without_smtp() {
        let service = EmailService::new(disabled_config());
        let result = service
            .send_password_reset("jane@gmail.com", "Jane", "http://localhost/reset/abc")
            .await;
        assert!(result.is_ok());
    }
}
