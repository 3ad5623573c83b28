use super::print_completed;
use crate::db::schema::default_goal_deadline;
use crate::display::{format_goal, format_money};
use crate::error::{Result, TrackerError};
use crate::models::goal::{DEADLINE_FORMAT, NewGoal};
use crate::operations::goals::{self, Funding};
use crate::operations::ledger::parse_amount;
use chrono::NaiveDate;
use clap::Subcommand;
use rusqlite::Connection;

const DEFAULT_ALLOCATION: u8 = 10;

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a goal that receives a share of every income
    Add {
        #[arg(short, long)]
        name: String,

        /// Target amount
        #[arg(short, long)]
        target: String,

        /// Percentage of each income routed to this goal (1-100)
        #[arg(short, long, default_value_t = DEFAULT_ALLOCATION)]
        allocation: u8,

        /// Deadline as YYYY-MM-DD (defaults to one year from today)
        #[arg(short, long)]
        deadline: Option<String>,

        /// Move this amount from the current balance into the goal right away
        #[arg(short, long)]
        fund: Option<String>,
    },

    /// List all goals with their progress
    List,

    /// Delete a goal
    Delete { id: i64 },

    /// Move money from the balance into a goal
    Fund { id: i64, amount: String },
}

pub fn handle_goal_command(conn: &Connection, cmd: GoalCommands, today: NaiveDate) -> Result<()> {
    match cmd {
        GoalCommands::Add {
            name,
            target,
            allocation,
            deadline,
            fund,
        } => {
            let target = parse_amount(&target)?;
            let deadline = match deadline {
                Some(raw) => NaiveDate::parse_from_str(raw.trim(), DEADLINE_FORMAT).map_err(|_| {
                    TrackerError::validation(format!("Invalid deadline '{}'. Please use YYYY-MM-DD.", raw))
                })?,
                None => default_goal_deadline(today),
            };
            let fund = fund.as_deref().map(parse_amount).transpose()?;
            let goal = NewGoal {
                name: name.trim().to_string(),
                target,
                allocation,
                deadline,
            };

            let created = goals::create_goal(conn, &goal, fund)?;
            println!("Created goal #{} '{}' ({}% of income)", created.goal_id, goal.name, allocation);
            match created.funding {
                Funding::NotRequested => {}
                Funding::Funded(amount) => println!("  Funded with {}", format_money(amount)),
                Funding::Insufficient { requested, balance } => println!(
                    "  Initial funding of {} skipped: balance is only {}",
                    format_money(requested),
                    format_money(balance)
                ),
            }
            print_completed(&created.completed);
        }

        GoalCommands::List => {
            let goals = goals::list_goals(conn)?;
            if goals.is_empty() {
                println!("No goals yet.");
                return Ok(());
            }
            let total: u32 = goals.iter().map(|g| u32::from(g.allocation)).sum();
            println!("Goals ({}% of income allocated)", total);
            println!("{}", "-".repeat(80));
            for goal in &goals {
                println!("{}", format_goal(goal, today));
            }
        }

        GoalCommands::Delete { id } => {
            goals::delete_goal(conn, id)?;
            println!("Deleted goal #{}", id);
        }

        GoalCommands::Fund { id, amount } => {
            let amount = parse_amount(&amount)?;
            let contribution = goals::contribute(conn, id, amount)?;
            println!(
                "Added {} to goal #{} (saved {})",
                format_money(amount),
                contribution.goal_id,
                format_money(contribution.saved)
            );
            print_completed(&contribution.completed);
        }
    }
    Ok(())
}
