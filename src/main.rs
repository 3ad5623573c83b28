mod cli;
mod config;
mod db;
mod display;
mod error;
mod logging;
mod models;
mod operations;

use clap::Parser;
use cli::Cli;
use config::AppConfig;
use display::format_money;
use error::Result;
use operations::cycle::{self, AllowanceOutcome, ReportOutcome};
use operations::mailer::SmtpMailer;
use rusqlite::Connection;
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init_tracing();
    let cli = Cli::parse();
    let config = cli.config();

    match run(&config, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig, command: Option<cli::Commands>) -> Result<()> {
    let conn = db::connection::establish_connection(&config.db_path)?;

    if config.run_cycle {
        startup_cycle(&conn, config)?;
    }

    match command {
        Some(command) => cli::run(&conn, config, command),
        None => {
            println!("Balance: {}", format_money(operations::ledger::current_balance(&conn)?));
            println!("Run with --help to see the available commands.");
            Ok(())
        }
    }
}

fn startup_cycle(conn: &Connection, config: &AppConfig) -> Result<()> {
    let mailer = SmtpMailer::new(db::settings_repository::get_settings(conn)?);
    let outcome = cycle::run_startup_cycle(conn, cli::now(), &config.out_dir, &mailer)?;

    if let AllowanceOutcome::Applied(receipt) = &outcome.allowance {
        println!(
            "Monthly allowance of {} added for {}",
            format_money(receipt.amount),
            outcome.month
        );
        cli::print_completed(&receipt.distribution.completed);
    }
    match &outcome.report {
        ReportOutcome::Sent(month) => println!("Monthly report for {} sent", month),
        ReportOutcome::Failed(reason) => {
            eprintln!("Warning: automatic report not sent ({}). Will retry next start.", reason)
        }
        ReportOutcome::Disabled | ReportOutcome::AlreadySent(_) => {}
    }
    Ok(())
}
