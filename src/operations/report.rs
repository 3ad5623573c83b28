use super::chart::{self, ChartImage};
use crate::db::ledger_repository;
use crate::display::format_money;
use crate::error::Result;
use crate::models::month::MonthStamp;
use crate::models::transaction::MonthlySummary;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::info;

const RULE_WIDTH: usize = 50;

/// Everything a transport needs to deliver the monthly summary
#[derive(Debug, Clone)]
pub struct MonthlyReport {
    pub month: MonthStamp,
    pub summary: MonthlySummary,
    pub balance: Decimal,
    pub chart: ChartImage,
}

impl MonthlyReport {
    pub fn subject(&self) -> String {
        format!("Financial Report - {}", self.month.long_name())
    }

    pub fn body(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        format!(
            "Monthly Financial Summary - {title}\n\
             {rule}\n\
             \n\
             Income:   {income}\n\
             Expenses: {expenses}\n\
             Net:      {net}\n\
             \n\
             Current Balance: {balance}\n\
             \n\
             {rule}\n\
             This is an automated report from Money Tracker.\n",
            title = self.month.long_name(),
            rule = rule,
            income = format_money(self.summary.income),
            expenses = format_money(self.summary.expense.abs()),
            net = format_money(self.summary.net()),
            balance = format_money(self.balance),
        )
    }
}

/// Delivers a monthly report. Failures are returned to the caller and never
/// roll back ledger state.
pub trait ReportTransport {
    fn send(&self, report: &MonthlyReport) -> Result<()>;
}

/// Reads the month's figures and writes its chart into `out_dir`
pub fn build_monthly_report(
    conn: &Connection,
    month: MonthStamp,
    out_dir: &Path,
) -> Result<(MonthlyReport, PathBuf)> {
    let (chart_path, chart) = chart::write_balance_chart(conn, month, out_dir)?;
    let summary = ledger_repository::get_monthly_summary(conn, month)?;
    let balance = ledger_repository::get_balance(conn)?;
    Ok((
        MonthlyReport {
            month,
            summary,
            balance,
            chart,
        },
        chart_path,
    ))
}

/// Builds and sends the report for `month`. Does not record the month as sent;
/// the monthly cycle owns that bookkeeping.
pub fn send_monthly_report(
    conn: &Connection,
    month: MonthStamp,
    out_dir: &Path,
    transport: &dyn ReportTransport,
) -> Result<MonthlyReport> {
    let (report, _) = build_monthly_report(conn, month, out_dir)?;
    transport.send(&report)?;
    info!(%month, "monthly report sent");
    Ok(report)
}
