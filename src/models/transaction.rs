use chrono::NaiveDateTime;
use rust_decimal::Decimal;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const ALLOWANCE_NOTE: &str = "Monthly Allowance";

/// A ledger entry. Positive amounts are income, negative amounts are expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub amount: Decimal,
    pub timestamp: NaiveDateTime,
    pub note: String,
}

impl Transaction {
    pub fn new(id: i64, amount: Decimal, timestamp: NaiveDateTime, note: String) -> Self {
        Self {
            id,
            amount,
            timestamp,
            note,
        }
    }

    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// Income and expense totals for one month. `expense` is zero or negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthlySummary {
    pub income: Decimal,
    pub expense: Decimal,
}

impl MonthlySummary {
    pub fn net(&self) -> Decimal {
        self.income + self.expense
    }
}
