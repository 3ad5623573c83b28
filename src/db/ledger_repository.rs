use super::decimal_at;
use crate::error::{Result, TrackerError};
use crate::models::month::MonthStamp;
use crate::models::transaction::{MonthlySummary, TIMESTAMP_FORMAT, Transaction};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN))
        })
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let raw_date: String = row.get(2)?;
    Ok(Transaction::new(
        row.get(0)?,
        decimal_at(row, 1)?,
        parse_timestamp(2, &raw_date)?,
        row.get::<_, Option<String>>(3)?.unwrap_or_default(),
    ))
}

pub fn insert_transaction(
    conn: &Connection,
    amount: Decimal,
    timestamp: NaiveDateTime,
    note: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions (amount, date, note) VALUES (?1, ?2, ?3)",
        params![
            amount.to_string(),
            timestamp.format(TIMESTAMP_FORMAT).to_string(),
            note,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Sum of every amount in the ledger
pub fn get_balance(conn: &Connection) -> Result<Decimal> {
    let mut stmt = conn.prepare("SELECT amount FROM transactions")?;
    let mut rows = stmt.query([])?;
    let mut balance = Decimal::ZERO;
    while let Some(row) = rows.next()? {
        balance = balance
            .checked_add(decimal_at(row, 0)?)
            .ok_or_else(|| TrackerError::overflow("ledger balance"))?;
    }
    Ok(balance)
}

/// Transactions dated within `month`, oldest first
pub fn get_monthly_transactions(conn: &Connection, month: MonthStamp) -> Result<Vec<Transaction>> {
    let start = month.first_day().and_time(NaiveTime::MIN);
    let end = month.next().first_day().and_time(NaiveTime::MIN);

    let mut stmt = conn.prepare(
        "SELECT id, amount, date, note FROM transactions
         WHERE date >= ?1 AND date < ?2
         ORDER BY date ASC, id ASC",
    )?;
    let transactions = stmt
        .query_map(
            [
                start.format(TIMESTAMP_FORMAT).to_string(),
                end.format(TIMESTAMP_FORMAT).to_string(),
            ],
            map_transaction,
        )?
        .collect::<rusqlite::Result<Vec<Transaction>>>()?;
    Ok(transactions)
}

pub fn get_monthly_summary(conn: &Connection, month: MonthStamp) -> Result<MonthlySummary> {
    let mut summary = MonthlySummary::default();
    for tx in get_monthly_transactions(conn, month)? {
        let total = if tx.is_income() {
            &mut summary.income
        } else {
            &mut summary.expense
        };
        *total = total
            .checked_add(tx.amount)
            .ok_or_else(|| TrackerError::overflow("monthly summary"))?;
    }
    Ok(summary)
}

#[cfg(test)]
pub fn count_transactions(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(1) FROM transactions", [], |row| row.get(0))?)
}
