use super::decimal_at;
use crate::error::Result;
use crate::models::month::MonthStamp;
use crate::models::settings::AllowanceConfig;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use tracing::warn;

pub fn get_allowance(conn: &Connection) -> Result<AllowanceConfig> {
    let row = conn
        .query_row(
            "SELECT amount, last_applied FROM allowance WHERE id = 1",
            [],
            |row| Ok((decimal_at(row, 0)?, row.get::<_, Option<String>>(1)?)),
        )
        .optional()?;

    let Some((amount, last_applied)) = row else {
        return Ok(AllowanceConfig::default());
    };
    let last_applied = last_applied.and_then(|raw| match raw.parse::<MonthStamp>() {
        Ok(month) => Some(month),
        Err(e) => {
            warn!(error = %e, "ignoring malformed allowance month");
            None
        }
    });
    Ok(AllowanceConfig {
        amount,
        last_applied,
    })
}

/// Replaces the allowance amount. The applied month is kept: it only moves
/// when an allowance is actually posted.
pub fn set_allowance(conn: &Connection, amount: Decimal) -> Result<()> {
    conn.execute(
        "INSERT INTO allowance (id, amount, last_applied) VALUES (1, ?1, NULL)
         ON CONFLICT(id) DO UPDATE SET amount = excluded.amount",
        [amount.to_string()],
    )?;
    Ok(())
}

pub fn mark_applied(conn: &Connection, month: MonthStamp) -> Result<()> {
    conn.execute(
        "INSERT INTO allowance (id, amount, last_applied) VALUES (1, '0', ?1)
         ON CONFLICT(id) DO UPDATE SET last_applied = excluded.last_applied",
        params![month.to_string()],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;

    fn month(s: &str) -> MonthStamp {
        s.parse().unwrap()
    }

    #[test]
    fn test_get_allowance_defaults_when_unset() {
        let conn = establish_test_connection().unwrap();
        let config = get_allowance(&conn).unwrap();
        assert_eq!(config.amount, Decimal::ZERO);
        assert_eq!(config.last_applied, None);
    }

    #[test]
    fn test_set_and_mark_applied() {
        let conn = establish_test_connection().unwrap();
        set_allowance(&conn, Decimal::from(50)).unwrap();
        mark_applied(&conn, month("2024-01")).unwrap();

        let config = get_allowance(&conn).unwrap();
        assert_eq!(config.amount, Decimal::from(50));
        assert_eq!(config.last_applied, Some(month("2024-01")));
    }

    #[test]
    fn test_set_allowance_keeps_applied_month() {
        let conn = establish_test_connection().unwrap();
        set_allowance(&conn, Decimal::from(50)).unwrap();
        mark_applied(&conn, month("2024-01")).unwrap();

        set_allowance(&conn, Decimal::from(75)).unwrap();
        let config = get_allowance(&conn).unwrap();
        assert_eq!(config.amount, Decimal::from(75));
        assert_eq!(config.last_applied, Some(month("2024-01")));
    }

    #[test]
    fn test_malformed_month_reads_as_never_applied() {
        let conn = establish_test_connection().unwrap();
        conn.execute(
            "INSERT INTO allowance (id, amount, last_applied) VALUES (1, '20', 'January')",
            [],
        )
        .unwrap();

        let config = get_allowance(&conn).unwrap();
        assert_eq!(config.amount, Decimal::from(20));
        assert_eq!(config.last_applied, None);
    }
}
