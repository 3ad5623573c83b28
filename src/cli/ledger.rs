use super::print_completed;
use crate::db::ledger_repository;
use crate::display::format_money;
use crate::error::Result;
use crate::models::month::MonthStamp;
use crate::models::transaction::TIMESTAMP_FORMAT;
use crate::operations::{chart, export, ledger};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::path::Path;

pub fn handle_income(conn: &Connection, amount: &str, note: &str, now: NaiveDateTime) -> Result<()> {
    let amount = ledger::parse_amount(amount)?;
    let receipt = ledger::record_income(conn, amount, note, now)?;

    println!("Added income of {}", format_money(receipt.amount));
    let allocated = receipt.distribution.total_allocated();
    if !allocated.is_zero() {
        println!(
            "  {} allocated to {} goal(s)",
            format_money(allocated),
            receipt.distribution.allocations.len()
        );
    }
    print_completed(&receipt.distribution.completed);
    println!("Balance: {}", format_money(ledger::current_balance(conn)?));
    Ok(())
}

pub fn handle_expense(conn: &Connection, amount: &str, note: &str, now: NaiveDateTime) -> Result<()> {
    let amount = ledger::parse_amount(amount)?;
    ledger::record_expense(conn, amount, note, now)?;
    println!("Added expense of {}", format_money(amount));
    println!("Balance: {}", format_money(ledger::current_balance(conn)?));
    Ok(())
}

pub fn handle_balance(conn: &Connection) -> Result<()> {
    println!("Balance: {}", format_money(ledger::current_balance(conn)?));
    Ok(())
}

pub fn handle_history(conn: &Connection, month: MonthStamp) -> Result<()> {
    let history = ledger::monthly_history(conn, month)?;
    if history.is_empty() {
        println!("No transactions in {}.", month.long_name());
        return Ok(());
    }

    println!("Transactions for {}", month.long_name());
    println!("{}", "-".repeat(72));
    println!("{:<20} {:>16} {:>16}  Note", "Date", "Amount", "Balance");
    for (tx, running) in &history {
        println!(
            "{:<20} {:>16} {:>16}  {}",
            tx.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format_money(tx.amount),
            format_money(*running),
            tx.note
        );
    }
    Ok(())
}

pub fn handle_summary(conn: &Connection, month: MonthStamp) -> Result<()> {
    let summary = ledger_repository::get_monthly_summary(conn, month)?;
    println!("Summary for {}", month.long_name());
    println!("{}", "-".repeat(40));
    println!("Income:   {}", format_money(summary.income));
    println!("Expenses: {}", format_money(summary.expense.abs()));
    println!("Net:      {}", format_money(summary.net()));
    println!();
    println!("Current Balance: {}", format_money(ledger::current_balance(conn)?));
    Ok(())
}

pub fn handle_export(conn: &Connection, month: MonthStamp, out_dir: &Path) -> Result<()> {
    let (path, rows) = export::export_monthly_csv(conn, month, out_dir)?;
    println!("Exported {} transaction(s) to {}", rows, path.display());
    Ok(())
}

pub fn handle_chart(conn: &Connection, month: MonthStamp, out_dir: &Path, preview: bool) -> Result<()> {
    let (path, _) = chart::write_balance_chart(conn, month, out_dir)?;
    println!("Chart saved to {}", path.display());
    if preview {
        chart::preview_balance_chart(conn, month)?;
    }
    Ok(())
}
