//! Aggregation over transaction collections.
//!
//! Every function here is a stateless fold: it takes a slice of transactions plus one
//! immutable [`DisplayContext`] snapshot and produces derived numbers. Amounts are
//! converted into the display currency before summation, so each transaction is
//! converted exactly once per aggregate.

use crate::convert::DisplayContext;
use crate::model::{Goal, Pillar, Transaction};
use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Bucket for transactions with no category.
pub const OTHER_CATEGORY: &str = "Other";

/// Size of the trailing window used to estimate monthly savings for projections.
pub const SAVINGS_WINDOW_DAYS: i64 = 30;

/// Converted totals per pillar. Non-negative whenever input amounts are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PillarTotals {
    pub earn: Decimal,
    pub spend: Decimal,
    pub save: Decimal,
    pub invest: Decimal,
}

impl PillarTotals {
    pub fn get(&self, pillar: Pillar) -> Decimal {
        match pillar {
            Pillar::Earn => self.earn,
            Pillar::Spend => self.spend,
            Pillar::Save => self.save,
            Pillar::Invest => self.invest,
        }
    }

    pub fn sum(&self) -> Decimal {
        self.earn + self.spend + self.save + self.invest
    }
}

/// Sums converted amounts grouped by pillar. No sign flips: each pillar's total is
/// the plain sum of its transactions.
pub fn pillar_totals(transactions: &[Transaction], ctx: &DisplayContext) -> PillarTotals {
    let mut totals = PillarTotals::default();
    for t in transactions {
        let amount = ctx.convert_transaction(t);
        match t.pillar() {
            Pillar::Earn => totals.earn += amount,
            Pillar::Spend => totals.spend += amount,
            Pillar::Save => totals.save += amount,
            Pillar::Invest => totals.invest += amount,
        }
    }
    totals
}

/// Per-account running balance: Earn flows into the account, every other pillar
/// flows out of it. Accounts that only ever paid out show a negative balance.
pub fn account_balances(
    transactions: &[Transaction],
    ctx: &DisplayContext,
) -> BTreeMap<String, Decimal> {
    let mut balances: BTreeMap<String, Decimal> = BTreeMap::new();
    for t in transactions {
        let amount = ctx.convert_transaction(t);
        let balance = balances.entry(t.account().to_string()).or_default();
        match t.pillar() {
            Pillar::Earn => *balance += amount,
            _ => *balance -= amount,
        }
    }
    balances
}

/// Earn and Spend sums for one calendar month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthFlow {
    pub earn: Decimal,
    pub spend: Decimal,
}

/// Groups Earn and Spend transactions by calendar month. Keys are `(year, month)`;
/// months with no activity are absent, not zero-filled. Save and Invest are excluded
/// from cash flow.
pub fn monthly_cash_flow(
    transactions: &[Transaction],
    ctx: &DisplayContext,
) -> BTreeMap<(i32, u32), MonthFlow> {
    let mut months: BTreeMap<(i32, u32), MonthFlow> = BTreeMap::new();
    for t in transactions {
        let bucket = match t.pillar() {
            Pillar::Earn | Pillar::Spend => {
                months.entry((t.date().year(), t.date().month())).or_default()
            }
            _ => continue,
        };
        let amount = ctx.convert_transaction(t);
        match t.pillar() {
            Pillar::Earn => bucket.earn += amount,
            Pillar::Spend => bucket.spend += amount,
            _ => unreachable!(),
        }
    }
    months
}

/// Groups Spend transactions by category, with uncategorized spending collected under
/// [`OTHER_CATEGORY`]. Used for proportional displays.
pub fn category_breakdown(
    transactions: &[Transaction],
    ctx: &DisplayContext,
) -> BTreeMap<String, Decimal> {
    let mut categories: BTreeMap<String, Decimal> = BTreeMap::new();
    for t in transactions {
        if t.pillar() != Pillar::Spend {
            continue;
        }
        let category = if t.category().is_empty() {
            OTHER_CATEGORY
        } else {
            t.category()
        };
        *categories.entry(category.to_string()).or_default() += ctx.convert_transaction(t);
    }
    categories
}

/// The savings-rate financial-health score, in [0, 100].
///
/// `(save + invest) / earn * 100`, capped at 100. With zero income the denominator is
/// 1 instead: a user who earned nothing but saved something scores favorably rather
/// than dividing by zero or scoring 0. That is deliberate product behavior, not a
/// guard artifact.
pub fn health_score(totals: &PillarTotals) -> Decimal {
    let denominator = if totals.earn > Decimal::ZERO {
        totals.earn
    } else {
        Decimal::ONE
    };
    let rate = (totals.save + totals.invest) / denominator * Decimal::from(100);
    rate.clamp(Decimal::ZERO, Decimal::from(100))
}

/// Presentation banding for the health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Excellent,
    Stable,
    Critical,
}

serde_plain::derive_display_from_serialize!(HealthStatus);

pub fn health_status(score: Decimal) -> HealthStatus {
    if score >= Decimal::from(30) {
        HealthStatus::Excellent
    } else if score >= Decimal::from(10) {
        HealthStatus::Stable
    } else {
        HealthStatus::Critical
    }
}

/// Percent progress toward a goal, clamped to [0, 100]. A non-positive target is
/// treated as a target of 1 so the division stays defined.
pub fn goal_progress(goal: &Goal) -> Decimal {
    let target = goal.target_amount().value();
    let target = if target > Decimal::ZERO {
        target
    } else {
        Decimal::ONE
    };
    let percent = goal.current_amount().value() / target * Decimal::from(100);
    percent.clamp(Decimal::ZERO, Decimal::from(100))
}

/// Sum of converted Save-pillar amounts within the trailing savings window ending at
/// `today` (inclusive).
pub fn recent_monthly_savings(
    transactions: &[Transaction],
    ctx: &DisplayContext,
    today: NaiveDate,
) -> Decimal {
    let mut total = Decimal::ZERO;
    for t in transactions {
        if t.pillar() != Pillar::Save {
            continue;
        }
        let days_ago = today.signed_duration_since(t.date()).num_days();
        if (0..SAVINGS_WINDOW_DAYS).contains(&days_ago) {
            total += ctx.convert_transaction(t);
        }
    }
    total
}

/// Projected whole months until the goal's remaining amount is covered at
/// `monthly_savings` per month. `None` means undetermined: with no recent savings
/// there is nothing sensible to project.
pub fn goal_projection(goal: &Goal, monthly_savings: Decimal) -> Option<u32> {
    if monthly_savings <= Decimal::ZERO {
        return None;
    }
    let months = (goal.remaining() / monthly_savings).ceil();
    months.to_u32()
}

/// One yearly snapshot of a compound growth projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct YearSnapshot {
    pub year: u32,
    pub invested: Decimal,
    pub interest: Decimal,
    pub balance: Decimal,
}

/// Projects compound growth of an initial amount plus monthly contributions.
///
/// Returns `years + 1` snapshots, where snapshot 0 is the starting state. The annual
/// rate compounds monthly; each contribution lands at the start of its month and
/// accrues that month's interest. Snapshot values are rounded to two decimal places;
/// the running balance keeps full precision between snapshots.
pub fn compound_growth(
    initial: Decimal,
    monthly_contribution: Decimal,
    annual_rate_percent: Decimal,
    years: u32,
) -> Vec<YearSnapshot> {
    let monthly_rate = annual_rate_percent / Decimal::from(100) / Decimal::from(12);
    let growth = Decimal::ONE + monthly_rate;
    let mut balance = initial;
    let mut invested = initial;
    let mut snapshots = Vec::with_capacity(years as usize + 1);
    for year in 0..=years {
        if year > 0 {
            for _ in 0..12 {
                balance = (balance + monthly_contribution) * growth;
                invested += monthly_contribution;
            }
        }
        snapshots.push(YearSnapshot {
            year,
            invested: round2(invested),
            interest: round2(balance - invested),
            balance: round2(balance),
        });
    }
    snapshots
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}
