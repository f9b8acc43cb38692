use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, instrument};

use crate::core::notify::Notifier;
use crate::core::report::Report;

/// Delivers reports as plain-text mail over an authenticated STARTTLS relay.
pub struct SmtpNotifier {
    sender: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    pub fn new(
        host: &str,
        port: u16,
        sender: &str,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        let sender: Mailbox = sender
            .parse()
            .with_context(|| format!("Invalid sender address: {sender}"))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .with_context(|| format!("Failed to configure SMTP relay: {host}"))?
            .port(port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();
        Ok(Self { sender, transport })
    }

    pub fn build_message(&self, report: &Report, recipient: &str) -> Result<Message> {
        let to: Mailbox = recipient
            .parse()
            .with_context(|| format!("Invalid recipient address: {recipient}"))?;
        Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(report.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(report.body())
            .context("Failed to build message")
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    #[instrument(name = "SmtpSend", skip(self, report))]
    async fn send(&self, report: &Report, recipient: &str) -> Result<()> {
        let message = self.build_message(report, recipient)?;
        debug!("Sending report");
        self.transport
            .send(message)
            .await
            .with_context(|| format!("Failed to send email to {recipient}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::ReportLine;

    fn report() -> Report {
        Report {
            timestamp: "2024-07-15 06:30:00 PDT-0700".to_string(),
            subject: "Financial Data Update".to_string(),
            lines: vec![ReportLine {
                label: "S&P 500 Open".to_string(),
                value: "5500.12".to_string(),
            }],
        }
    }

    fn notifier() -> SmtpNotifier {
        SmtpNotifier::new("smtp.example.com", 587, "sender@example.com", "sender", "secret")
            .unwrap()
    }

    #[tokio::test]
    async fn test_build_message() {
        let message = notifier().build_message(&report(), "to@example.com").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("From: sender@example.com"));
        assert!(raw.contains("To: to@example.com"));
        assert!(raw.contains("Subject: Financial Data Update"));
        assert!(raw.contains("S&P 500 Open: 5500.12"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_an_error() {
        let result = notifier().build_message(&report(), "not an address");
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid recipient address")
        );
    }

    #[test]
    fn test_invalid_sender_is_rejected() {
        let result = SmtpNotifier::new("smtp.example.com", 587, "nobody", "u", "p");
        assert!(result.is_err());
    }
}
