use super::ledger;
use crate::error::Result;
use crate::models::month::MonthStamp;
use crate::models::transaction::TIMESTAMP_FORMAT;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn export_file_name(month: MonthStamp) -> String {
    format!("finance_{}.csv", month.file_suffix())
}

/// Writes the month's transactions to `finance_YYYY_MM.csv` in `out_dir` with
/// a running balance column. Returns the path and the number of rows written.
pub fn export_monthly_csv(
    conn: &Connection,
    month: MonthStamp,
    out_dir: &Path,
) -> Result<(PathBuf, usize)> {
    let history = ledger::monthly_history(conn, month)?;

    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(export_file_name(month));
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["Amount", "Date", "Balance"])?;
    for (transaction, balance) in &history {
        writer.write_record([
            format!("{:.2}", transaction.amount.round_dp(2)),
            transaction.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.2}", balance.round_dp(2)),
        ])?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = history.len(), "monthly export written");
    Ok((path, history.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ledger_repository;
    use crate::db::connection::establish_test_connection;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::tempdir;

    fn insert(conn: &Connection, amount: &str, day: u32) {
        let at = NaiveDate::from_ymd_opt(2024, 2, day)
            .unwrap()
            .and_hms_opt(18, 5, 0)
            .unwrap();
        ledger_repository::insert_transaction(conn, Decimal::from_str(amount).unwrap(), at, "")
            .unwrap();
    }

    #[test]
    fn test_export_monthly_csv() {
        let conn = establish_test_connection().unwrap();
        insert(&conn, "1500", 1);
        insert(&conn, "-20.5", 2);
        insert(&conn, "3.333", 10);
        let dir = tempdir().unwrap();
        let month = MonthStamp::new(2024, 2).unwrap();

        let (path, rows) = export_monthly_csv(&conn, month, dir.path()).unwrap();

        assert_eq!(rows, 3);
        assert_eq!(path.file_name().unwrap(), "finance_2024_02.csv");
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Amount,Date,Balance",
                "1500.00,2024-02-01 18:05:00,1500.00",
                "-20.50,2024-02-02 18:05:00,1479.50",
                "3.33,2024-02-10 18:05:00,1482.83",
            ]
        );
    }

    #[test]
    fn test_export_empty_month_writes_header_only() {
        let conn = establish_test_connection().unwrap();
        let dir = tempdir().unwrap();
        let month = MonthStamp::new(2023, 7).unwrap();

        let (path, rows) = export_monthly_csv(&conn, month, dir.path()).unwrap();

        assert_eq!(rows, 0);
        assert_eq!(fs::read_to_string(path).unwrap(), "Amount,Date,Balance\n");
    }
}
