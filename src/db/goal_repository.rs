use super::decimal_at;
use crate::error::{Result, TrackerError};
use crate::models::goal::{DEADLINE_FORMAT, Goal, NewGoal};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use tracing::debug;

const GOAL_SELECT: &str =
    "SELECT id, name, target, saved, allocation, deadline, notified FROM goals";

fn map_goal(row: &Row<'_>) -> rusqlite::Result<Goal> {
    let allocation: i64 = row.get(4)?;
    Ok(Goal {
        id: row.get(0)?,
        name: row.get(1)?,
        target: decimal_at(row, 2)?,
        saved: decimal_at(row, 3)?,
        allocation: allocation.clamp(0, 100) as u8,
        deadline: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        notified: row.get::<_, Option<i64>>(6)?.unwrap_or(0) != 0,
    })
}

/// Inserts a goal with nothing saved yet and returns its id
pub fn insert_goal(conn: &Connection, goal: &NewGoal) -> Result<i64> {
    conn.execute(
        "INSERT INTO goals (name, target, saved, allocation, deadline, notified)
         VALUES (?1, ?2, '0', ?3, ?4, 0)",
        params![
            goal.name.trim(),
            goal.target.to_string(),
            goal.allocation,
            goal.deadline.format(DEADLINE_FORMAT).to_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_goal(conn: &Connection, id: i64) -> Result<Option<Goal>> {
    let goal = conn
        .query_row(&format!("{} WHERE id = ?1", GOAL_SELECT), [id], map_goal)
        .optional()?;
    Ok(goal)
}

pub fn get_all_goals(conn: &Connection) -> Result<Vec<Goal>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", GOAL_SELECT))?;
    let goals = stmt
        .query_map([], map_goal)?
        .collect::<rusqlite::Result<Vec<Goal>>>()?;
    Ok(goals)
}

/// Sum of allocation percentages over all live goals
pub fn total_allocation(conn: &Connection) -> Result<u32> {
    let total: i64 =
        conn.query_row("SELECT COALESCE(SUM(allocation), 0) FROM goals", [], |row| row.get(0))?;
    Ok(total.max(0) as u32)
}

/// Adds `delta` to a goal's saved amount and returns the new value. The read
/// and write happen here on one connection, so callers never redo the arithmetic.
pub fn add_to_saved(conn: &Connection, id: i64, delta: Decimal) -> Result<Decimal> {
    if delta < Decimal::ZERO {
        return Err(TrackerError::validation(
            "Saved amount can only increase",
        ));
    }
    let current = conn
        .query_row("SELECT saved FROM goals WHERE id = ?1", [id], |row| decimal_at(row, 0))
        .optional()?
        .ok_or_else(|| TrackerError::goal_not_found(id))?;

    let updated = current
        .checked_add(delta)
        .ok_or_else(|| TrackerError::overflow("goal saved amount"))?;
    conn.execute(
        "UPDATE goals SET saved = ?2 WHERE id = ?1",
        params![id, updated.to_string()],
    )?;
    debug!(goal_id = id, %delta, saved = %updated, "goal saved amount increased");
    Ok(updated)
}

/// Sets the notified flag. Returns false when it was already set, so a
/// completion is only ever reported once.
pub fn mark_notified(conn: &Connection, id: i64) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE goals SET notified = 1 WHERE id = ?1 AND notified = 0",
        [id],
    )?;
    Ok(rows == 1)
}

pub fn delete_goal(conn: &Connection, id: i64) -> Result<()> {
    let rows = conn.execute("DELETE FROM goals WHERE id = ?1", [id])?;
    if rows == 0 {
        return Err(TrackerError::goal_not_found(id));
    }
    Ok(())
}
