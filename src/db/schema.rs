use crate::error::Result;
use crate::models::settings::{DEFAULT_SMTP_PORT, DEFAULT_SMTP_SERVER};
use chrono::{Local, Months, NaiveDate};
use rusqlite::{Connection, params};
use std::collections::HashSet;
use tracing::{debug, info};

pub const SCHEMA_VERSION: i64 = 2;

const GOAL_COLUMNS: [(&str, &str); 5] = [
    ("id", "NULL"),
    ("name", "''"),
    ("target", "0"),
    ("saved", "0"),
    ("allocation", "0"),
];

/// Brings the database up to `SCHEMA_VERSION`. Each step commits together with
/// its `user_version` bump, so an interrupted upgrade resumes where it stopped.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    debug!(version, "opening database");

    if version < 1 {
        let tx = conn.unchecked_transaction()?;
        apply_migration_1(&tx)?;
        tx.pragma_update(None, "user_version", 1)?;
        tx.commit()?;
        version = 1;
    }

    if version < 2 {
        let tx = conn.unchecked_transaction()?;
        let default_deadline = default_goal_deadline(Local::now().date_naive());
        apply_migration_2(&tx, default_deadline)?;
        tx.pragma_update(None, "user_version", 2)?;
        tx.commit()?;
        version = 2;
    }

    if version > SCHEMA_VERSION {
        debug!(version, "database written by a newer version");
    }

    Ok(())
}

/// Deadline given to goals that predate deadlines: one year from today
pub fn default_goal_deadline(today: NaiveDate) -> NaiveDate {
    today.checked_add_months(Months::new(12)).unwrap_or(today)
}

fn apply_migration_1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount TEXT NOT NULL,
            date TEXT NOT NULL,
            note TEXT
        );

        CREATE TABLE IF NOT EXISTS goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            target TEXT NOT NULL,
            saved TEXT NOT NULL DEFAULT '0',
            allocation INTEGER NOT NULL,
            deadline TEXT NOT NULL,
            notified INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS allowance (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            amount TEXT NOT NULL DEFAULT '0',
            last_applied TEXT
        );

        CREATE TABLE IF NOT EXISTS app_settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            smtp_server TEXT,
            smtp_port INTEGER,
            use_ssl INTEGER,
            sender_email TEXT,
            sender_password TEXT,
            recipient_email TEXT,
            auto_email INTEGER,
            last_email_sent TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
        ",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_settings (
            id, smtp_server, smtp_port, use_ssl, sender_email,
            sender_password, recipient_email, auto_email, last_email_sent
        ) VALUES (1, ?1, ?2, 1, '', '', '', 0, NULL)",
        params![DEFAULT_SMTP_SERVER, DEFAULT_SMTP_PORT],
    )?;
    Ok(())
}

/// Goals tables from before deadlines and completion notices are rebuilt with
/// the current layout. Existing rows are kept; missing values get defaults.
fn apply_migration_2(conn: &Connection, default_deadline: NaiveDate) -> Result<()> {
    let columns = goal_columns(conn)?;
    if columns.contains("deadline") && columns.contains("notified") {
        return Ok(());
    }
    info!(?columns, "rebuilding legacy goals table");

    let mut select: Vec<String> = GOAL_COLUMNS
        .iter()
        .map(|(name, fallback)| {
            if columns.contains(*name) {
                name.to_string()
            } else {
                fallback.to_string()
            }
        })
        .collect();
    select.push(if columns.contains("deadline") {
        "COALESCE(NULLIF(deadline, ''), ?1)".to_string()
    } else {
        "?1".to_string()
    });
    select.push(if columns.contains("notified") {
        "COALESCE(notified, 0)".to_string()
    } else {
        "0".to_string()
    });

    conn.execute_batch(
        "
        ALTER TABLE goals RENAME TO goals_legacy;
        CREATE TABLE goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            target TEXT NOT NULL,
            saved TEXT NOT NULL DEFAULT '0',
            allocation INTEGER NOT NULL,
            deadline TEXT NOT NULL,
            notified INTEGER NOT NULL DEFAULT 0
        );
        ",
    )?;
    let copied = conn.execute(
        &format!(
            "INSERT INTO goals (id, name, target, saved, allocation, deadline, notified)
             SELECT {} FROM goals_legacy",
            select.join(", ")
        ),
        [default_deadline.to_string()],
    )?;
    conn.execute("DROP TABLE goals_legacy", [])?;
    info!(copied, "legacy goals migrated");
    Ok(())
}

fn goal_columns(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('goals')")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<HashSet<String>>>()?;
    Ok(names)
}
