use super::report::{MonthlyReport, ReportTransport};
use crate::error::{Result, TrackerError};
use crate::models::settings::ReportSettings;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

/// Sends monthly reports over SMTP with the chart attached
pub struct SmtpMailer {
    settings: ReportSettings,
}

impl SmtpMailer {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    fn ensure_configured(&self) -> Result<()> {
        let missing = self.settings.missing_fields();
        if !missing.is_empty() {
            return Err(TrackerError::NotConfigured(format!(
                "Email settings incomplete, missing {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    fn mailbox(address: &str) -> Result<Mailbox> {
        address
            .trim()
            .parse()
            .map_err(|e| TrackerError::validation(format!("Invalid email address {}: {}", address, e)))
    }

    pub fn compose(&self, report: &MonthlyReport) -> Result<Message> {
        let content_type = ContentType::parse(report.chart.content_type)
            .map_err(|e| TrackerError::Transport(e.to_string()))?;
        let attachment =
            Attachment::new(report.chart.file_name.clone()).body(report.chart.bytes.clone(), content_type);

        Message::builder()
            .from(Self::mailbox(&self.settings.sender_email)?)
            .to(Self::mailbox(&self.settings.recipient_email)?)
            .subject(report.subject())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(report.body()))
                    .singlepart(attachment),
            )
            .map_err(|e| TrackerError::Transport(e.to_string()))
    }

    fn transport(&self) -> Result<SmtpTransport> {
        let server = self.settings.smtp_server.trim();
        let builder = if self.settings.use_ssl {
            SmtpTransport::relay(server)
        } else {
            SmtpTransport::starttls_relay(server)
        }
        .map_err(|e| TrackerError::Transport(e.to_string()))?;

        Ok(builder
            .port(self.settings.smtp_port)
            .credentials(Credentials::new(
                self.settings.sender_email.trim().to_string(),
                self.settings.sender_password.clone(),
            ))
            .build())
    }
}

impl ReportTransport for SmtpMailer {
    fn send(&self, report: &MonthlyReport) -> Result<()> {
        self.ensure_configured()?;
        let message = self.compose(report)?;
        debug!(
            server = %self.settings.smtp_server,
            port = self.settings.smtp_port,
            ssl = self.settings.use_ssl,
            "connecting to smtp server"
        );
        self.transport()?
            .send(&message)
            .map_err(|e| TrackerError::Transport(e.to_string()))?;
        info!(recipient = %self.settings.recipient_email, month = %report.month, "report emailed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::month::MonthStamp;
    use crate::models::transaction::MonthlySummary;
    use crate::operations::chart::ChartImage;
    use rust_decimal::Decimal;

    fn settings() -> ReportSettings {
        ReportSettings {
            sender_email: "me@example.com".to_string(),
            sender_password: "app-password".to_string(),
            recipient_email: "you@example.com".to_string(),
            ..ReportSettings::default()
        }
    }

    fn report() -> MonthlyReport {
        MonthlyReport {
            month: MonthStamp::new(2024, 2).unwrap(),
            summary: MonthlySummary {
                income: Decimal::new(150000, 2),
                expense: Decimal::new(-25075, 2),
            },
            balance: Decimal::new(134925, 2),
            chart: ChartImage {
                file_name: "balance_2024_02.svg".to_string(),
                content_type: "image/svg+xml",
                bytes: b"<svg></svg>".to_vec(),
            },
        }
    }

    #[test]
    fn test_incomplete_settings_not_configured() {
        let mailer = SmtpMailer::new(ReportSettings::default());
        match mailer.send(&report()) {
            Err(TrackerError::NotConfigured(msg)) => {
                assert!(msg.contains("sender email"));
                assert!(msg.contains("recipient email"));
            }
            _ => panic!("expected NotConfigured"),
        }
    }

    #[test]
    fn test_compose_message() {
        let mailer = SmtpMailer::new(settings());
        let message = mailer.compose(&report()).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("Subject: Financial Report - February 2024"));
        assert!(raw.contains("From: me@example.com"));
        assert!(raw.contains("To: you@example.com"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("balance_2024_02.svg"));
        assert!(raw.contains("image/svg+xml"));
    }

    #[test]
    fn test_compose_rejects_bad_address() {
        let mut bad = settings();
        bad.recipient_email = "not an address".to_string();
        let mailer = SmtpMailer::new(bad);
        assert!(mailer.compose(&report()).unwrap_err().is_validation());
    }
}
