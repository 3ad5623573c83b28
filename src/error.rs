//! Error type shared by the stores, the allocation engine and the report shell.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    /// SQLite failures. Any open transaction has been rolled back.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed user input (amounts, percentages, dates, names)
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Total allocation would be {total}% (requested {requested}%). Maximum is 100%.")]
    OverAllocation { requested: u8, total: u32 },

    #[error("Amount € {requested:.2} exceeds current balance (€ {balance:.2})")]
    InsufficientBalance { requested: Decimal, balance: Decimal },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Money arithmetic left the representable range; nothing was written
    #[error("Amount out of range while computing the {0}")]
    Overflow(&'static str),

    /// Report settings are incomplete
    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Report transport failed: {0}")]
    Transport(String),
}

impl TrackerError {
    pub fn goal_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Goal",
            id,
        }
    }

    pub fn overflow(what: &'static str) -> Self {
        Self::Overflow(what)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for rejected operations that never touched the store
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::OverAllocation { .. } | Self::InsufficientBalance { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
