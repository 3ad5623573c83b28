use crate::models::goal::{Goal, GoalStatus};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Formats an amount as `€ 1,234.56`. Negative amounts keep their sign after
/// the currency symbol.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let fixed = format!("{:.2}", rounded.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("€ {}{}.{}", sign, grouped, cents)
}

pub fn format_goal(goal: &Goal, today: NaiveDate) -> String {
    let marker = match goal.status() {
        GoalStatus::Active => "",
        GoalStatus::Reached | GoalStatus::Completed => "  [completed]",
    };
    format!(
        "#{:<4} {:<24} {:>3}%  {} / {}  ({}%)  {} days left{}",
        goal.id,
        goal.name,
        goal.allocation,
        format_money(goal.saved),
        format_money(goal.target),
        goal.progress_percentage(),
        goal.days_remaining(today),
        marker
    )
}
