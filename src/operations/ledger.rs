use super::allocation::{self, Distribution};
use crate::db::ledger_repository;
use crate::error::{Result, TrackerError};
use crate::models::month::MonthStamp;
use crate::models::transaction::Transaction;
use chrono::NaiveDateTime;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::info;

const MAX_NOTE_LEN: usize = 255;
/// Largest amount accepted for a single transaction
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// A posted income together with what it did to the goals
#[derive(Debug, Clone)]
pub struct IncomeReceipt {
    pub transaction_id: i64,
    pub amount: Decimal,
    pub distribution: Distribution,
}

/// Parses a user supplied amount. Amounts are magnitudes; the direction comes
/// from the command.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let amount = Decimal::from_str(input.trim()).map_err(|_| {
        TrackerError::validation(format!(
            "Invalid amount format {}. Please provide a valid decimal number.",
            input
        ))
    })?;
    check_amount(amount, "Amount")?;
    Ok(amount)
}

/// Rejects amounts that are not positive or larger than `MAX_AMOUNT`
pub fn check_amount(amount: Decimal, what: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(TrackerError::validation(format!(
            "{} must be greater than zero",
            what
        )));
    }
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(TrackerError::validation(format!(
            "{} exceeds the maximum of {}",
            what, MAX_AMOUNT
        )));
    }
    Ok(())
}

fn check_note(note: &str) -> Result<()> {
    if note.len() > MAX_NOTE_LEN {
        return Err(TrackerError::validation("Note too long"));
    }
    Ok(())
}

/// Posts an income and routes its shares into the goals, all in one
/// transaction.
pub fn record_income(
    conn: &Connection,
    amount: Decimal,
    note: &str,
    now: NaiveDateTime,
) -> Result<IncomeReceipt> {
    check_amount(amount, "Income")?;
    check_note(note)?;

    let tx = conn.unchecked_transaction()?;
    let receipt = post_income(&tx, amount, note, now)?;
    tx.commit()?;

    info!(
        transaction_id = receipt.transaction_id,
        %amount,
        allocated = %receipt.distribution.total_allocated(),
        "income recorded"
    );
    Ok(receipt)
}

/// Inserts the income row and distributes it. Expects an open transaction.
pub(crate) fn post_income(
    conn: &Connection,
    amount: Decimal,
    note: &str,
    now: NaiveDateTime,
) -> Result<IncomeReceipt> {
    let transaction_id = ledger_repository::insert_transaction(conn, amount, now, note)?;
    let distribution = allocation::distribute_income(conn, amount)?;
    Ok(IncomeReceipt {
        transaction_id,
        amount,
        distribution,
    })
}

/// Posts an expense as a negative amount. Expenses never touch the goals.
pub fn record_expense(
    conn: &Connection,
    amount: Decimal,
    note: &str,
    now: NaiveDateTime,
) -> Result<i64> {
    check_amount(amount, "Expense")?;
    check_note(note)?;

    let id = ledger_repository::insert_transaction(conn, -amount, now, note)?;
    info!(transaction_id = id, %amount, "expense recorded");
    Ok(id)
}

pub fn current_balance(conn: &Connection) -> Result<Decimal> {
    ledger_repository::get_balance(conn)
}

/// The month's transactions paired with a running balance that starts at zero
pub fn monthly_history(conn: &Connection, month: MonthStamp) -> Result<Vec<(Transaction, Decimal)>> {
    let mut running = Decimal::ZERO;
    let mut history = Vec::new();
    for tx in ledger_repository::get_monthly_transactions(conn, month)? {
        running = running
            .checked_add(tx.amount)
            .ok_or_else(|| TrackerError::overflow("running balance"))?;
        history.push((tx, running));
    }
    Ok(history)
}
