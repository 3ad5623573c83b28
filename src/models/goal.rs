use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

pub const DEADLINE_FORMAT: &str = "%Y-%m-%d";
const MAX_TARGET: i64 = 1_000_000_000_000;

/// A savings goal. `deadline` is kept as stored text so a malformed value
/// never prevents the goal from loading.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: i64,
    pub name: String,
    pub target: Decimal,
    pub saved: Decimal,
    pub allocation: u8,
    pub deadline: String,
    pub notified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    Active,
    /// Target reached but the completion has not been reported yet
    Reached,
    Completed,
}

impl Goal {
    pub fn has_reached_target(&self) -> bool {
        self.target > Decimal::ZERO && self.saved >= self.target
    }

    pub fn status(&self) -> GoalStatus {
        if self.notified {
            GoalStatus::Completed
        } else if self.has_reached_target() {
            GoalStatus::Reached
        } else {
            GoalStatus::Active
        }
    }

    /// Whole percent towards the target, capped at 100. Non-positive targets
    /// count as no progress.
    pub fn progress_percentage(&self) -> u8 {
        if self.target <= Decimal::ZERO {
            return 0;
        }
        let Some(ratio) = self
            .saved
            .checked_div(self.target)
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        else {
            return 100;
        };
        let ratio = ratio.trunc();
        ratio.to_u8().unwrap_or(if ratio > Decimal::ZERO { 100 } else { 0 }).min(100)
    }

    /// Days until the deadline; 0 when the stored deadline cannot be parsed
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        match NaiveDate::parse_from_str(&self.deadline, DEADLINE_FORMAT) {
            Ok(deadline) => (deadline - today).num_days(),
            Err(_) => 0,
        }
    }
}

/// Input for goal creation, validated before anything is written.
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub name: String,
    pub target: Decimal,
    pub allocation: u8,
    pub deadline: NaiveDate,
}

impl NewGoal {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Goal name cannot be empty".to_string());
        }
        if self.name.len() > 100 {
            return Err("Goal name too long".to_string());
        }
        if self.target <= Decimal::ZERO {
            return Err("Goal target must be greater than zero".to_string());
        }
        if self.target > Decimal::from(MAX_TARGET) {
            return Err(format!("Goal target exceeds the maximum of {}", MAX_TARGET));
        }
        if !(1..=100).contains(&self.allocation) {
            return Err(format!(
                "Invalid allocation {}%. Must be between 1 and 100",
                self.allocation
            ));
        }
        Ok(())
    }
}
