//! Distribution of incoming money across savings goals.
//!
//! Each goal receives `income * allocation / 100` of every positive amount.
//! Shares are computed per goal and never normalised, so when the allocations
//! sum to less than 100% the remainder simply stays unassigned.

use crate::db::goal_repository;
use crate::error::{Result, TrackerError};
use crate::models::goal::Goal;
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::info;

/// One goal's share of an incoming amount
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub goal_id: i64,
    pub increment: Decimal,
}

/// Outcome of routing an amount into the goals
#[derive(Debug, Clone, Default)]
pub struct Distribution {
    pub allocations: Vec<Allocation>,
    /// Goals whose completion was reported by this pass
    pub completed: Vec<Goal>,
}

impl Distribution {
    pub fn total_allocated(&self) -> Decimal {
        self.allocations
            .iter()
            .fold(Decimal::ZERO, |total, a| total.saturating_add(a.increment))
    }
}

/// Computes each goal's share of `income`. Non-positive amounts (expenses)
/// allocate nothing.
pub fn allocate(income: Decimal, goals: &[Goal]) -> Result<Vec<Allocation>> {
    if income <= Decimal::ZERO {
        return Ok(Vec::new());
    }
    goals
        .iter()
        .filter(|goal| goal.allocation > 0)
        .map(|goal| -> Result<Allocation> {
            let share = income
                .checked_mul(Decimal::from(goal.allocation))
                .ok_or_else(|| TrackerError::overflow("goal allocation"))?;
            Ok(Allocation {
                goal_id: goal.id,
                increment: share / Decimal::ONE_HUNDRED,
            })
        })
        .collect()
}

/// Goals that reached their target but whose completion was not reported yet
pub fn newly_completed(goals: &[Goal]) -> Vec<&Goal> {
    goals
        .iter()
        .filter(|goal| goal.has_reached_target() && !goal.notified)
        .collect()
}

/// Applies `income` to every goal through the store's add primitive, then
/// settles completions. Runs on the caller's open transaction.
pub fn distribute_income(conn: &Connection, income: Decimal) -> Result<Distribution> {
    let goals = goal_repository::get_all_goals(conn)?;
    let allocations = allocate(income, &goals)?;
    for allocation in &allocations {
        goal_repository::add_to_saved(conn, allocation.goal_id, allocation.increment)?;
    }
    let completed = settle_completions(conn)?;
    Ok(Distribution {
        allocations,
        completed,
    })
}

/// Flags every newly completed goal as notified and returns them. A goal is
/// returned by at most one call over its lifetime.
pub fn settle_completions(conn: &Connection) -> Result<Vec<Goal>> {
    let goals = goal_repository::get_all_goals(conn)?;
    let mut completed = Vec::new();
    for goal in newly_completed(&goals) {
        if goal_repository::mark_notified(conn, goal.id)? {
            info!(goal_id = goal.id, name = %goal.name, "goal reached its target");
            completed.push(Goal {
                notified: true,
                ..goal.clone()
            });
        }
    }
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;
    use crate::models::goal::NewGoal;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn goal(id: i64, allocation: u8, saved: &str, target: &str) -> Goal {
        Goal {
            id,
            name: format!("Goal {}", id),
            target: dec(target),
            saved: dec(saved),
            allocation,
            deadline: "2030-01-01".to_string(),
            notified: false,
        }
    }

    fn insert(conn: &Connection, name: &str, target: &str, allocation: u8) -> i64 {
        goal_repository::insert_goal(
            conn,
            &NewGoal {
                name: name.to_string(),
                target: dec(target),
                allocation,
                deadline: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_allocate_by_percentage() {
        let goals = vec![goal(1, 20, "0", "1000"), goal(2, 35, "0", "1000")];
        let allocations = allocate(dec("500"), &goals).unwrap();

        assert_eq!(
            allocations,
            vec![
                Allocation {
                    goal_id: 1,
                    increment: dec("100"),
                },
                Allocation {
                    goal_id: 2,
                    increment: dec("175"),
                },
            ]
        );
    }

    #[test]
    fn test_allocate_does_not_normalise_remainder() {
        let goals = vec![goal(1, 10, "0", "1000")];
        let allocations = allocate(dec("200"), &goals).unwrap();
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].increment, dec("20"));
    }

    #[test]
    fn test_allocate_keeps_fractional_cents() {
        let goals = vec![goal(1, 15, "0", "1000")];
        let allocations = allocate(dec("333.33"), &goals).unwrap();
        assert_eq!(allocations[0].increment, dec("49.9995"));
    }

    #[test]
    fn test_allocate_ignores_expenses_and_zero() {
        let goals = vec![goal(1, 50, "0", "1000")];
        assert!(allocate(dec("-40"), &goals).unwrap().is_empty());
        assert!(allocate(Decimal::ZERO, &goals).unwrap().is_empty());
    }

    #[test]
    fn test_allocate_is_order_independent() {
        let goals = vec![goal(1, 20, "0", "1000"), goal(2, 30, "0", "1000")];
        let incomes = [dec("500"), dec("120.40"), dec("7")];

        let mut forward = [Decimal::ZERO; 2];
        for income in incomes.iter() {
            for (i, a) in allocate(*income, &goals).unwrap().iter().enumerate() {
                forward[i] += a.increment;
            }
        }
        let mut backward = [Decimal::ZERO; 2];
        for income in incomes.iter().rev() {
            for (i, a) in allocate(*income, &goals).unwrap().iter().enumerate() {
                backward[i] += a.increment;
            }
        }

        assert_eq!(forward, backward);
        assert_eq!(forward[0], dec("627.40") * dec("0.20"));
        assert_eq!(forward[1], dec("627.40") * dec("0.30"));
    }

    #[test]
    fn test_allocate_overflow_is_an_error() {
        let goals = vec![goal(1, 50, "0", "1000")];
        let result = allocate(Decimal::MAX, &goals);
        assert!(matches!(result, Err(TrackerError::Overflow(_))));
    }

    #[test]
    fn test_newly_completed() {
        let mut done = goal(1, 10, "1000", "1000");
        let reported = {
            let mut g = goal(2, 10, "2000", "1000");
            g.notified = true;
            g
        };
        let pending = goal(3, 10, "10", "1000");
        let zero_target = goal(4, 10, "10", "0");

        let goals = vec![done.clone(), reported, pending, zero_target];
        let completed = newly_completed(&goals);
        assert_eq!(completed, vec![&done]);

        done.notified = true;
        assert!(newly_completed(&[done]).is_empty());
    }

    #[test]
    fn test_distribute_income_updates_store() {
        let conn = establish_test_connection().unwrap();
        let laptop = insert(&conn, "Laptop", "1000", 20);
        let trip = insert(&conn, "Trip", "300", 10);

        let distribution = distribute_income(&conn, dec("500")).unwrap();
        assert_eq!(distribution.allocations.len(), 2);
        assert_eq!(distribution.total_allocated(), dec("150"));
        assert!(distribution.completed.is_empty());

        let laptop = goal_repository::get_goal(&conn, laptop).unwrap().unwrap();
        let trip = goal_repository::get_goal(&conn, trip).unwrap().unwrap();
        assert_eq!(laptop.saved, dec("100"));
        assert_eq!(trip.saved, dec("50"));
    }

    #[test]
    fn test_completion_reported_once() {
        let conn = establish_test_connection().unwrap();
        let id = insert(&conn, "Laptop", "1000", 20);
        goal_repository::add_to_saved(&conn, id, dec("950")).unwrap();

        let first = distribute_income(&conn, dec("300")).unwrap();
        assert_eq!(first.completed.len(), 1);
        assert_eq!(first.completed[0].id, id);
        assert_eq!(first.completed[0].saved, dec("1010"));
        assert!(first.completed[0].notified);

        let second = distribute_income(&conn, dec("300")).unwrap();
        assert!(second.completed.is_empty());

        let stored = goal_repository::get_goal(&conn, id).unwrap().unwrap();
        assert_eq!(stored.saved, dec("1070"));
        assert!(stored.notified);
    }

    #[test]
    fn test_settle_completions_without_new_money() {
        let conn = establish_test_connection().unwrap();
        let id = insert(&conn, "Phone", "200", 5);
        goal_repository::add_to_saved(&conn, id, dec("200")).unwrap();

        let completed = settle_completions(&conn).unwrap();
        assert_eq!(completed.len(), 1);
        assert!(settle_completions(&conn).unwrap().is_empty());
    }
}
