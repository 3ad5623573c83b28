use crate::config::AppConfig;
use crate::db::settings_repository;
use crate::error::{Result, TrackerError};
use crate::models::settings::ReportSettings;
use crate::operations::mailer::SmtpMailer;
use crate::operations::report;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rusqlite::Connection;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Email the monthly report now. Does not affect the automatic schedule.
    Send {
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Email settings
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    Show,
    Set(SettingsArgs),
}

#[derive(Args, Default)]
pub struct SettingsArgs {
    #[arg(long)]
    pub smtp_server: Option<String>,

    #[arg(long)]
    pub smtp_port: Option<u16>,

    /// Use implicit TLS
    #[arg(long, conflicts_with = "no_ssl")]
    pub ssl: bool,

    /// Use STARTTLS instead of implicit TLS
    #[arg(long)]
    pub no_ssl: bool,

    #[arg(long)]
    pub sender: Option<String>,

    /// Password or app password for the sender account
    #[arg(long)]
    pub password: Option<String>,

    #[arg(long)]
    pub recipient: Option<String>,

    /// Send the report automatically at the first start of each month
    #[arg(long, conflicts_with = "no_auto_send")]
    pub auto_send: bool,

    #[arg(long)]
    pub no_auto_send: bool,
}

impl SettingsArgs {
    /// Overlays the given flags on the stored settings
    pub fn apply(self, mut settings: ReportSettings) -> ReportSettings {
        if let Some(server) = self.smtp_server {
            settings.smtp_server = server;
        }
        if let Some(port) = self.smtp_port {
            settings.smtp_port = port;
        }
        if self.ssl {
            settings.use_ssl = true;
        }
        if self.no_ssl {
            settings.use_ssl = false;
        }
        if let Some(sender) = self.sender {
            settings.sender_email = sender;
        }
        if let Some(password) = self.password {
            settings.sender_password = password;
        }
        if let Some(recipient) = self.recipient {
            settings.recipient_email = recipient;
        }
        if self.auto_send {
            settings.auto_send = true;
        }
        if self.no_auto_send {
            settings.auto_send = false;
        }
        settings
    }
}

pub fn handle_report_command(
    conn: &Connection,
    config: &AppConfig,
    cmd: ReportCommands,
    today: NaiveDate,
) -> Result<()> {
    match cmd {
        ReportCommands::Send { month } => {
            let month = super::resolve_month(month.as_deref(), today)?;
            let mailer = SmtpMailer::new(settings_repository::get_settings(conn)?);
            let sent = report::send_monthly_report(conn, month, &config.out_dir, &mailer)?;
            println!("Sent '{}'", sent.subject());
        }

        ReportCommands::Settings(SettingsCommands::Show) => {
            let settings = settings_repository::get_settings(conn)?;
            println!("SMTP server:  {}:{}", settings.smtp_server, settings.smtp_port);
            println!("Encryption:   {}", if settings.use_ssl { "SSL/TLS" } else { "STARTTLS" });
            println!("Sender:       {}", settings.sender_email);
            println!(
                "Password:     {}",
                if settings.sender_password.is_empty() { "(not set)" } else { "********" }
            );
            println!("Recipient:    {}", settings.recipient_email);
            println!("Auto-send:    {}", if settings.auto_send { "on" } else { "off" });
            match settings.last_sent {
                Some(month) => println!("Last sent:    {}", month),
                None => println!("Last sent:    never"),
            }
        }

        ReportCommands::Settings(SettingsCommands::Set(args)) => {
            let settings = args.apply(settings_repository::get_settings(conn)?);
            if settings.smtp_server.trim().is_empty() {
                return Err(TrackerError::validation("SMTP server cannot be empty"));
            }
            if settings.smtp_port == 0 {
                return Err(TrackerError::validation("SMTP port must be between 1 and 65535"));
            }
            settings_repository::save_settings(conn, &settings)?;
            println!("Email settings saved");
            let missing = settings.missing_fields();
            if settings.auto_send && !missing.is_empty() {
                println!("Warning: auto-send is on but {} not set", missing.join(", "));
            }
        }
    }
    Ok(())
}
