//! Once-per-month startup work: posting the recurring allowance and sending
//! the automatic report.
//!
//! Both steps are gated on the current month-stamp, so running the cycle again
//! within the same month changes nothing. The allowance always runs first so
//! the report sees the posted amount.

use super::ledger::{self, IncomeReceipt};
use super::report::{self, ReportTransport};
use crate::db::{allowance_repository, settings_repository};
use crate::error::Result;
use crate::models::month::MonthStamp;
use crate::models::transaction::ALLOWANCE_NOTE;
use chrono::NaiveDateTime;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub enum AllowanceOutcome {
    /// No positive allowance amount is configured
    NotConfigured,
    AlreadyApplied(MonthStamp),
    Applied(IncomeReceipt),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Disabled,
    AlreadySent(MonthStamp),
    Sent(MonthStamp),
    /// The stamp was left untouched so the next startup retries
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub month: MonthStamp,
    pub allowance: AllowanceOutcome,
    pub report: ReportOutcome,
}

/// Posts the allowance for the month of `now` unless it was already posted.
/// The transaction, its distribution and the applied stamp commit together.
pub fn apply_monthly_allowance(conn: &Connection, now: NaiveDateTime) -> Result<AllowanceOutcome> {
    let month = MonthStamp::of_datetime(now);
    let config = allowance_repository::get_allowance(conn)?;
    if config.amount <= Decimal::ZERO {
        return Ok(AllowanceOutcome::NotConfigured);
    }
    if !config.is_due(month) {
        return Ok(AllowanceOutcome::AlreadyApplied(month));
    }

    let tx = conn.unchecked_transaction()?;
    let receipt = ledger::post_income(&tx, config.amount, ALLOWANCE_NOTE, now)?;
    allowance_repository::mark_applied(&tx, month)?;
    tx.commit()?;

    info!(%month, amount = %config.amount, "monthly allowance applied");
    Ok(AllowanceOutcome::Applied(receipt))
}

/// Sends the report for `month` when auto-send is on and it has not gone out
/// yet. Only a successful send records the month.
pub fn auto_send_report(
    conn: &Connection,
    month: MonthStamp,
    out_dir: &Path,
    transport: &dyn ReportTransport,
) -> Result<ReportOutcome> {
    let settings = settings_repository::get_settings(conn)?;
    if !settings.auto_send {
        return Ok(ReportOutcome::Disabled);
    }
    if !settings.auto_send_due(month) {
        return Ok(ReportOutcome::AlreadySent(month));
    }

    match report::send_monthly_report(conn, month, out_dir, transport) {
        Ok(_) => {
            settings_repository::mark_sent(conn, month)?;
            Ok(ReportOutcome::Sent(month))
        }
        Err(e) => {
            warn!(%month, error = %e, "automatic report failed, will retry on next start");
            Ok(ReportOutcome::Failed(e.to_string()))
        }
    }
}

pub fn run_startup_cycle(
    conn: &Connection,
    now: NaiveDateTime,
    out_dir: &Path,
    transport: &dyn ReportTransport,
) -> Result<CycleOutcome> {
    let month = MonthStamp::of_datetime(now);
    let allowance = apply_monthly_allowance(conn, now)?;
    let report = auto_send_report(conn, month, out_dir, transport)?;
    Ok(CycleOutcome {
        month,
        allowance,
        report,
    })
}
