pub mod allowance_repository;
pub mod connection;
pub mod goal_repository;
pub mod ledger_repository;
pub mod schema;
pub mod settings_repository;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rusqlite::Row;
use rusqlite::types::{Type, ValueRef};
use std::str::FromStr;

/// Reads a money column. Amounts are written as decimal text, but databases
/// created by older versions hold REAL values, so every storage class is accepted.
pub(crate) fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(Decimal::ZERO),
        ValueRef::Integer(value) => Ok(Decimal::from(value)),
        ValueRef::Real(value) => Decimal::from_f64(value).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                Type::Real,
                format!("{} is not representable as a decimal", value).into(),
            )
        }),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?;
            Decimal::from_str(text.trim())
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
        }
        ValueRef::Blob(_) => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "amount".to_string(),
            Type::Blob,
        )),
    }
}
