use crate::db::allowance_repository;
use crate::display::format_money;
use crate::error::{Result, TrackerError};
use crate::operations::ledger::check_amount;
use clap::Subcommand;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum AllowanceCommands {
    /// Set the amount posted at the first start of every month (0 disables it)
    Set { amount: String },

    /// Show the configured allowance
    Show,
}

pub fn handle_allowance_command(conn: &Connection, cmd: AllowanceCommands) -> Result<()> {
    match cmd {
        AllowanceCommands::Set { amount } => {
            let amount = Decimal::from_str(amount.trim())
                .ok()
                .filter(|a| *a >= Decimal::ZERO)
                .ok_or_else(|| {
                    TrackerError::validation(format!("Invalid allowance amount '{}'", amount))
                })?;
            if !amount.is_zero() {
                check_amount(amount, "Allowance")?;
            }
            allowance_repository::set_allowance(conn, amount)?;
            if amount.is_zero() {
                println!("Monthly allowance disabled");
            } else {
                println!("Monthly allowance set to {}", format_money(amount));
            }
        }

        AllowanceCommands::Show => {
            let config = allowance_repository::get_allowance(conn)?;
            println!("Monthly allowance: {}", format_money(config.amount));
            match config.last_applied {
                Some(month) => println!("Last applied:      {}", month),
                None => println!("Last applied:      never"),
            }
        }
    }
    Ok(())
}
