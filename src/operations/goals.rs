use super::allocation;
use super::ledger::check_amount;
use crate::db::{goal_repository, ledger_repository};
use crate::error::{Result, TrackerError};
use crate::models::goal::{Goal, NewGoal};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::{info, warn};

const MAX_TOTAL_ALLOCATION: u32 = 100;

/// What happened to the optional funding requested at creation
#[derive(Debug, Clone, PartialEq)]
pub enum Funding {
    NotRequested,
    Funded(Decimal),
    /// The goal was created without funds
    Insufficient { requested: Decimal, balance: Decimal },
}

#[derive(Debug, Clone)]
pub struct GoalCreated {
    pub goal_id: i64,
    pub funding: Funding,
    pub completed: Vec<Goal>,
}

#[derive(Debug, Clone)]
pub struct Contribution {
    pub goal_id: i64,
    pub saved: Decimal,
    pub completed: Vec<Goal>,
}

/// Creates a goal, optionally earmarking `initial_funding` from the balance.
///
/// The total allocation over all goals, including the new one, must stay at
/// or below 100% or nothing is written. Funding that exceeds the current
/// balance is skipped while the goal itself is still created.
pub fn create_goal(
    conn: &Connection,
    goal: &NewGoal,
    initial_funding: Option<Decimal>,
) -> Result<GoalCreated> {
    goal.validate().map_err(TrackerError::Validation)?;
    if let Some(amount) = initial_funding {
        check_amount(amount, "Initial funding")?;
    }

    let tx = conn.unchecked_transaction()?;

    let total = goal_repository::total_allocation(&tx)? + u32::from(goal.allocation);
    if total > MAX_TOTAL_ALLOCATION {
        return Err(TrackerError::OverAllocation {
            requested: goal.allocation,
            total,
        });
    }

    let goal_id = goal_repository::insert_goal(&tx, goal)?;

    let funding = match initial_funding {
        None => Funding::NotRequested,
        Some(requested) => {
            let balance = ledger_repository::get_balance(&tx)?;
            if requested > balance {
                warn!(%requested, %balance, "initial funding exceeds balance, skipped");
                Funding::Insufficient { requested, balance }
            } else {
                goal_repository::add_to_saved(&tx, goal_id, requested)?;
                Funding::Funded(requested)
            }
        }
    };
    let completed = allocation::settle_completions(&tx)?;
    tx.commit()?;

    info!(goal_id, name = %goal.name, allocation = goal.allocation, "goal created");
    Ok(GoalCreated {
        goal_id,
        funding,
        completed,
    })
}

/// Moves `amount` of the current balance into a goal's saved amount
pub fn contribute(conn: &Connection, goal_id: i64, amount: Decimal) -> Result<Contribution> {
    check_amount(amount, "Contribution")?;

    let tx = conn.unchecked_transaction()?;
    if goal_repository::get_goal(&tx, goal_id)?.is_none() {
        return Err(TrackerError::goal_not_found(goal_id));
    }
    let balance = ledger_repository::get_balance(&tx)?;
    if amount > balance {
        return Err(TrackerError::InsufficientBalance {
            requested: amount,
            balance,
        });
    }
    let saved = goal_repository::add_to_saved(&tx, goal_id, amount)?;
    let completed = allocation::settle_completions(&tx)?;
    tx.commit()?;

    info!(goal_id, %amount, %saved, "goal funded");
    Ok(Contribution {
        goal_id,
        saved,
        completed,
    })
}

pub fn list_goals(conn: &Connection) -> Result<Vec<Goal>> {
    goal_repository::get_all_goals(conn)
}

pub fn delete_goal(conn: &Connection, goal_id: i64) -> Result<()> {
    goal_repository::delete_goal(conn, goal_id)?;
    info!(goal_id, "goal deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;
    use crate::operations::ledger;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn new_goal(name: &str, target: &str, allocation: u8) -> NewGoal {
        NewGoal {
            name: name.to_string(),
            target: dec(target),
            allocation,
            deadline: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        }
    }

    fn deposit(conn: &Connection, amount: &str) {
        let now = NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        ledger::record_income(conn, dec(amount), "Deposit", now).unwrap();
    }

    #[test]
    fn test_create_goals_up_to_one_hundred_percent() {
        let conn = establish_test_connection().unwrap();
        create_goal(&conn, &new_goal("A", "100", 40), None).unwrap();
        create_goal(&conn, &new_goal("B", "100", 35), None).unwrap();
        let last = create_goal(&conn, &new_goal("C", "100", 25), None).unwrap();

        assert_eq!(last.funding, Funding::NotRequested);
        assert_eq!(goal_repository::total_allocation(&conn).unwrap(), 100);
    }

    #[test]
    fn test_over_allocation_rejected_without_mutation() {
        let conn = establish_test_connection().unwrap();
        create_goal(&conn, &new_goal("A", "100", 50), None).unwrap();
        create_goal(&conn, &new_goal("B", "100", 40), None).unwrap();
        let before = list_goals(&conn).unwrap();

        let result = create_goal(&conn, &new_goal("C", "100", 15), Some(dec("10")));

        match result {
            Err(TrackerError::OverAllocation { requested, total }) => {
                assert_eq!(requested, 15);
                assert_eq!(total, 105);
            }
            other => panic!("expected over-allocation, got {:?}", other),
        }
        assert_eq!(list_goals(&conn).unwrap(), before);
    }

    #[test]
    fn test_invalid_goal_rejected() {
        let conn = establish_test_connection().unwrap();
        let result = create_goal(&conn, &new_goal("", "100", 10), None);
        assert!(result.unwrap_err().is_validation());

        let result = create_goal(&conn, &new_goal("A", "100", 10), Some(Decimal::ZERO));
        assert!(result.unwrap_err().is_validation());
        assert!(list_goals(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_initial_funding_from_balance() {
        let conn = establish_test_connection().unwrap();
        deposit(&conn, "300");

        let created = create_goal(&conn, &new_goal("Bike", "500", 10), Some(dec("200"))).unwrap();

        assert_eq!(created.funding, Funding::Funded(dec("200")));
        let goal = goal_repository::get_goal(&conn, created.goal_id).unwrap().unwrap();
        assert_eq!(goal.saved, dec("200"));
    }

    #[test]
    fn test_failed_funding_rolls_back_goal_insert() {
        let conn = establish_test_connection().unwrap();
        deposit(&conn, "300");
        conn.execute_batch(
            "CREATE TRIGGER block_goal_updates BEFORE UPDATE ON goals
             BEGIN SELECT RAISE(ABORT, 'goal updates blocked'); END;",
        )
        .unwrap();

        let result = create_goal(&conn, &new_goal("Bike", "500", 10), Some(dec("200")));

        assert!(matches!(result, Err(TrackerError::Storage(_))));
        assert!(list_goals(&conn).unwrap().is_empty());
        assert_eq!(goal_repository::total_allocation(&conn).unwrap(), 0);
        assert_eq!(ledger::current_balance(&conn).unwrap(), dec("300"));
    }

    #[test]
    fn test_oversized_funding_rejected() {
        let conn = establish_test_connection().unwrap();
        let result = create_goal(
            &conn,
            &new_goal("Bike", "500", 10),
            Some(dec("50000000000000000000000000000")),
        );
        assert!(result.unwrap_err().is_validation());
        assert!(list_goals(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_insufficient_funding_still_creates_goal() {
        let conn = establish_test_connection().unwrap();
        deposit(&conn, "50");

        let created = create_goal(&conn, &new_goal("Bike", "500", 10), Some(dec("80"))).unwrap();

        assert_eq!(
            created.funding,
            Funding::Insufficient {
                requested: dec("80"),
                balance: dec("50"),
            }
        );
        let goal = goal_repository::get_goal(&conn, created.goal_id).unwrap().unwrap();
        assert_eq!(goal.saved, Decimal::ZERO);
    }

    #[test]
    fn test_initial_funding_can_complete_goal() {
        let conn = establish_test_connection().unwrap();
        deposit(&conn, "1000");

        let created = create_goal(&conn, &new_goal("Watch", "250", 5), Some(dec("250"))).unwrap();

        assert_eq!(created.completed.len(), 1);
        assert_eq!(created.completed[0].id, created.goal_id);
        assert!(goal_repository::get_goal(&conn, created.goal_id).unwrap().unwrap().notified);
    }

    #[test]
    fn test_contribute() {
        let conn = establish_test_connection().unwrap();
        deposit(&conn, "400");
        let created = create_goal(&conn, &new_goal("Bike", "500", 10), None).unwrap();

        let result = contribute(&conn, created.goal_id, dec("150")).unwrap();
        assert_eq!(result.saved, dec("150"));
        assert!(result.completed.is_empty());

        let too_much = contribute(&conn, created.goal_id, dec("401"));
        assert!(matches!(too_much, Err(TrackerError::InsufficientBalance { .. })));

        let missing = contribute(&conn, 999, dec("1"));
        assert!(missing.unwrap_err().is_not_found());
    }

    #[test]
    fn test_contribute_completes_goal_once() {
        let conn = establish_test_connection().unwrap();
        deposit(&conn, "1000");
        let created = create_goal(&conn, &new_goal("Bike", "300", 10), None).unwrap();

        let first = contribute(&conn, created.goal_id, dec("300")).unwrap();
        assert_eq!(first.completed.len(), 1);

        let second = contribute(&conn, created.goal_id, dec("10")).unwrap();
        assert!(second.completed.is_empty());
    }

    #[test]
    fn test_delete_frees_allocation() {
        let conn = establish_test_connection().unwrap();
        let created = create_goal(&conn, &new_goal("A", "100", 90), None).unwrap();
        assert!(create_goal(&conn, &new_goal("B", "100", 15), None).is_err());

        delete_goal(&conn, created.goal_id).unwrap();
        assert!(create_goal(&conn, &new_goal("B", "100", 15), None).is_ok());
    }
}
