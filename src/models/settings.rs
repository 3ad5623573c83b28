use super::month::MonthStamp;
use rust_decimal::Decimal;

pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Recurring monthly allowance. `last_applied` only moves when the allowance
/// has actually been posted to the ledger.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AllowanceConfig {
    pub amount: Decimal,
    pub last_applied: Option<MonthStamp>,
}

impl AllowanceConfig {
    pub fn is_due(&self, month: MonthStamp) -> bool {
        self.amount > Decimal::ZERO && self.last_applied != Some(month)
    }
}

/// Email transport settings and the auto-send bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub use_ssl: bool,
    pub sender_email: String,
    pub sender_password: String,
    pub recipient_email: String,
    pub auto_send: bool,
    pub last_sent: Option<MonthStamp>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            smtp_server: DEFAULT_SMTP_SERVER.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            use_ssl: true,
            sender_email: String::new(),
            sender_password: String::new(),
            recipient_email: String::new(),
            auto_send: false,
            last_sent: None,
        }
    }
}

impl ReportSettings {
    /// Names of the required fields that are still empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.sender_email.trim().is_empty() {
            missing.push("sender email");
        }
        if self.sender_password.is_empty() {
            missing.push("sender password");
        }
        if self.recipient_email.trim().is_empty() {
            missing.push("recipient email");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn auto_send_due(&self, month: MonthStamp) -> bool {
        self.auto_send && self.last_sent != Some(month)
    }
}
