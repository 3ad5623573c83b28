use crate::error::Result;
use crate::models::month::MonthStamp;
use crate::models::settings::{DEFAULT_SMTP_PORT, DEFAULT_SMTP_SERVER, ReportSettings};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::warn;

pub fn get_settings(conn: &Connection) -> Result<ReportSettings> {
    let settings = conn
        .query_row(
            "SELECT smtp_server, smtp_port, use_ssl, sender_email, sender_password,
                    recipient_email, auto_email, last_email_sent
             FROM app_settings WHERE id = 1",
            [],
            |row| {
                let port: Option<i64> = row.get(1)?;
                let last_sent: Option<String> = row.get(7)?;
                Ok(ReportSettings {
                    smtp_server: row
                        .get::<_, Option<String>>(0)?
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
                    smtp_port: port
                        .and_then(|p| u16::try_from(p).ok())
                        .filter(|p| *p > 0)
                        .unwrap_or(DEFAULT_SMTP_PORT),
                    use_ssl: row.get::<_, Option<i64>>(2)?.unwrap_or(1) != 0,
                    sender_email: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    sender_password: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    recipient_email: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    auto_send: row.get::<_, Option<i64>>(6)?.unwrap_or(0) != 0,
                    last_sent: last_sent.and_then(|raw| match raw.parse::<MonthStamp>() {
                        Ok(month) => Some(month),
                        Err(e) => {
                            warn!(error = %e, "ignoring malformed report month");
                            None
                        }
                    }),
                })
            },
        )
        .optional()?;
    Ok(settings.unwrap_or_default())
}

/// Stores the transport configuration and auto-send flag. The last-sent
/// month is owned by `mark_sent` and left untouched.
pub fn save_settings(conn: &Connection, settings: &ReportSettings) -> Result<()> {
    conn.execute(
        "INSERT INTO app_settings (
            id, smtp_server, smtp_port, use_ssl, sender_email,
            sender_password, recipient_email, auto_email, last_email_sent
         ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL)
         ON CONFLICT(id) DO UPDATE SET
            smtp_server = excluded.smtp_server,
            smtp_port = excluded.smtp_port,
            use_ssl = excluded.use_ssl,
            sender_email = excluded.sender_email,
            sender_password = excluded.sender_password,
            recipient_email = excluded.recipient_email,
            auto_email = excluded.auto_email",
        params![
            settings.smtp_server.trim(),
            settings.smtp_port,
            settings.use_ssl,
            settings.sender_email.trim(),
            settings.sender_password,
            settings.recipient_email.trim(),
            settings.auto_send,
        ],
    )?;
    Ok(())
}

pub fn get_last_sent(conn: &Connection) -> Result<Option<MonthStamp>> {
    Ok(get_settings(conn)?.last_sent)
}

pub fn mark_sent(conn: &Connection, month: MonthStamp) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO app_settings (
            id, smtp_server, smtp_port, use_ssl, sender_email,
            sender_password, recipient_email, auto_email, last_email_sent
         ) VALUES (1, ?1, ?2, 1, '', '', '', 0, NULL)",
        params![DEFAULT_SMTP_SERVER, DEFAULT_SMTP_PORT],
    )?;
    conn.execute(
        "UPDATE app_settings SET last_email_sent = ?1 WHERE id = 1",
        [month.to_string()],
    )?;
    Ok(())
}
