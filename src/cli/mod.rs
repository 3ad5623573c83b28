//! Command-line surface. Each handler runs one operation to completion and
//! prints its result.

mod allowance;
mod goal;
mod ledger;
mod report;

pub use allowance::AllowanceCommands;
pub use goal::GoalCommands;
pub use report::ReportCommands;

use crate::config::{AppConfig, DEFAULT_DB_PATH, DEFAULT_OUT_DIR};
use crate::error::{Result, TrackerError};
use crate::models::goal::Goal;
use crate::models::month::MonthStamp;
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mtrack",
    version,
    about = "Personal finance tracker with savings goals and monthly reports"
)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, env = "MONEY_TRACKER_DB", default_value = DEFAULT_DB_PATH, global = true)]
    pub db: PathBuf,

    /// Directory for CSV exports and charts
    #[arg(long, env = "MONEY_TRACKER_OUT_DIR", default_value = DEFAULT_OUT_DIR, global = true)]
    pub out_dir: PathBuf,

    /// Do not post the monthly allowance or send the automatic report
    #[arg(long, global = true)]
    pub skip_cycle: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn config(&self) -> AppConfig {
        AppConfig::new(self.db.clone(), self.out_dir.clone(), self.skip_cycle)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record an income; a share goes to every goal
    Income {
        /// Amount (e.g., "1500" or "1500.00")
        amount: String,
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Record an expense
    Expense {
        amount: String,
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Show the current balance
    Balance,

    /// List a month's transactions with a running balance
    History {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Income, expenses and net for a month
    Summary {
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Savings goals
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Recurring monthly allowance
    #[command(subcommand)]
    Allowance(AllowanceCommands),

    /// Export a month's transactions to CSV
    Export {
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Draw the month's balance trend
    Chart {
        #[arg(short, long)]
        month: Option<String>,

        /// Show the chart in the terminal as well
        #[arg(long)]
        preview: bool,
    },

    /// Monthly email report
    #[command(subcommand)]
    Report(ReportCommands),
}

pub fn run(conn: &Connection, config: &AppConfig, command: Commands) -> Result<()> {
    let now = now();
    match command {
        Commands::Income { amount, note } => ledger::handle_income(conn, &amount, &note, now),
        Commands::Expense { amount, note } => ledger::handle_expense(conn, &amount, &note, now),
        Commands::Balance => ledger::handle_balance(conn),
        Commands::History { month } => {
            ledger::handle_history(conn, resolve_month(month.as_deref(), now.date())?)
        }
        Commands::Summary { month } => {
            ledger::handle_summary(conn, resolve_month(month.as_deref(), now.date())?)
        }
        Commands::Export { month } => ledger::handle_export(
            conn,
            resolve_month(month.as_deref(), now.date())?,
            &config.out_dir,
        ),
        Commands::Chart { month, preview } => ledger::handle_chart(
            conn,
            resolve_month(month.as_deref(), now.date())?,
            &config.out_dir,
            preview,
        ),
        Commands::Goal(cmd) => goal::handle_goal_command(conn, cmd, now.date()),
        Commands::Allowance(cmd) => allowance::handle_allowance_command(conn, cmd),
        Commands::Report(cmd) => report::handle_report_command(conn, config, cmd, now.date()),
    }
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parses `YYYY-MM`, falling back to the month containing `today`
pub fn resolve_month(arg: Option<&str>, today: NaiveDate) -> Result<MonthStamp> {
    match arg {
        Some(raw) => raw.parse().map_err(TrackerError::Validation),
        None => Ok(MonthStamp::of(today)),
    }
}

pub fn print_completed(goals: &[Goal]) {
    for goal in goals {
        println!("🎉 Goal reached: {}", goal.name);
    }
}
