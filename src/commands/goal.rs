//! Goal command handlers.

use crate::args::{GoalAddArgs, GoalDeleteArgs, GoalUpdateArgs};
use crate::commands::{display_context, Out};
use crate::convert::CURRENCY_OF_RECORD;
use crate::model::{Goal, TransactionFilter};
use crate::report;
use crate::{Config, Result};
use anyhow::bail;
use rust_decimal::Decimal;
use serde::Serialize;

/// Creates a new savings goal. Amounts are in the currency of record.
pub async fn goal_add(config: Config, args: &GoalAddArgs) -> Result<Out<String>> {
    let goal = Goal::new(args.name(), args.target(), args.current(), args.deadline());
    config.db().insert_goal(&goal).await?;

    let id = goal.id().to_string();
    let message = format!("Added goal '{}' with ID: {id}", goal.name());
    Ok(Out::new(message, id))
}

/// Modifies an existing goal. Only the fields provided on the command line change.
pub async fn goal_update(config: Config, args: &GoalUpdateArgs) -> Result<Out<Goal>> {
    let Some(mut goal) = config.db().get_goal(args.id()).await? else {
        bail!("No goal found with id '{}'", args.id());
    };

    if let Some(name) = args.name() {
        goal.set_name(name.to_string());
    }
    if let Some(target) = args.target() {
        goal.set_target_amount(target);
    }
    if let Some(current) = args.current() {
        goal.set_current_amount(current);
    }
    if let Some(deadline) = args.deadline() {
        goal.set_deadline(deadline);
    }

    config.db().update_goal(&goal).await?;
    let message = format!("Updated goal {}", goal.id());
    Ok(Out::new(message, goal))
}

/// Deletes a goal by id.
pub async fn goal_delete(config: Config, args: &GoalDeleteArgs) -> Result<Out<()>> {
    config.db().delete_goal(args.id()).await?;
    Ok(format!("Deleted goal {}", args.id()).into())
}

/// One listed goal with progress and a savings-based completion projection.
#[derive(Debug, Clone, Serialize)]
pub struct GoalRow {
    pub id: String,
    pub name: String,
    pub target: String,
    pub current: String,
    pub progress_percent: Decimal,
    pub deadline: String,
    /// Whole months to completion at the recent savings pace; `None` when there were
    /// no savings in the trailing window.
    pub projected_months: Option<u32>,
}

/// Lists goals ordered by deadline, with percent progress and a projection of how
/// many months completion will take at the recent savings pace.
pub async fn goal_list(config: Config, today: chrono::NaiveDate) -> Result<Out<Vec<GoalRow>>> {
    let goals = config.db().goals().await?;
    let transactions = config.db().transactions(&TransactionFilter::default()).await?;
    let ctx = display_context(&config).await;

    // Goal amounts are kept in the currency of record; the projection must compare
    // like with like, so savings are measured in the record currency too.
    let record_ctx = crate::convert::DisplayContext::new(CURRENCY_OF_RECORD, ctx.matrix().clone());
    let monthly_savings = report::recent_monthly_savings(&transactions, &record_ctx, today);

    let rows: Vec<GoalRow> = goals
        .iter()
        .map(|goal| GoalRow {
            id: goal.id().to_string(),
            name: goal.name().to_string(),
            target: ctx.format_from(goal.target_amount().value(), CURRENCY_OF_RECORD),
            current: ctx.format_from(goal.current_amount().value(), CURRENCY_OF_RECORD),
            progress_percent: report::goal_progress(goal),
            deadline: goal.deadline().to_string(),
            projected_months: report::goal_projection(goal, monthly_savings),
        })
        .collect();

    let mut lines = vec![format!("{} goal(s)", rows.len())];
    for row in &rows {
        let projection = match row.projected_months {
            Some(0) => "reached".to_string(),
            Some(months) => format!("~{months} month(s) at current pace"),
            None => "no recent savings to project from".to_string(),
        };
        lines.push(format!(
            "{}  {} of {} ({}%) by {}  {}  ({})",
            row.name,
            row.current,
            row.target,
            row.progress_percent.round_dp(0),
            row.deadline,
            projection,
            row.id
        ));
    }

    Ok(Out::new(lines.join("\n"), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Pillar;
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use clap::Parser;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_goal_add_update_delete() {
        let env = TestEnv::new().await;
        let args = GoalAddArgs::try_parse_from([
            "add",
            "--name",
            "Emergency fund",
            "--target",
            "1000000",
            "--deadline",
            "2027-06-30",
        ])
        .unwrap();
        let out = goal_add(env.config(), &args).await.unwrap();
        let id = out.structure().unwrap().clone();

        let args =
            GoalUpdateArgs::try_parse_from(["update", "--id", &id, "--current", "250000"]).unwrap();
        let out = goal_update(env.config(), &args).await.unwrap();
        let updated = out.structure().unwrap();
        assert_eq!(updated.current_amount(), crate::model::Amount::from(250_000));
        assert_eq!(updated.name(), "Emergency fund");

        let args = GoalDeleteArgs::try_parse_from(["delete", "--id", &id]).unwrap();
        goal_delete(env.config(), &args).await.unwrap();
        assert!(env.config().db().goals().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_goal_list_with_projection() {
        let env = TestEnv::new().await;
        env.insert_goal("House", "1000000", "200000", "2028-01-01")
            .await;
        // 100,000 saved within the trailing window ending at `today`.
        env.insert_transaction("2026-08-20", "100000", Pillar::Save, "Bank", "")
            .await;

        let today = NaiveDate::from_str("2026-08-27").unwrap();
        let out = goal_list(env.config(), today).await.unwrap();
        let rows = out.structure().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].progress_percent, rust_decimal::Decimal::from(20));
        // 800,000 remaining at 100,000/month -> 8 months.
        assert_eq!(rows[0].projected_months, Some(8));
    }

    #[tokio::test]
    async fn test_goal_list_without_savings_has_no_projection() {
        let env = TestEnv::new().await;
        env.insert_goal("Trip", "500000", "0", "2027-01-01").await;

        let today = NaiveDate::from_str("2026-08-27").unwrap();
        let out = goal_list(env.config(), today).await.unwrap();
        let rows = out.structure().unwrap();
        assert_eq!(rows[0].projected_months, None);
        assert!(out.message().contains("no recent savings"));
    }
}
