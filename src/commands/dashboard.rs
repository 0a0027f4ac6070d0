//! Dashboard command handler.

use crate::commands::{display_context, Out};
use crate::model::{Pillar, TransactionFilter};
use crate::report::{
    self, HealthStatus, MonthFlow, PillarTotals,
};
use crate::{Config, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Earn and Spend for one calendar month, flattened for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct MonthRow {
    pub year: i32,
    pub month: u32,
    pub earn: Decimal,
    pub spend: Decimal,
}

/// Everything the dashboard shows, with raw numbers in the display currency.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub currency: String,
    pub totals: PillarTotals,
    pub health_score: Decimal,
    pub health_status: HealthStatus,
    pub accounts: BTreeMap<String, Decimal>,
    pub months: Vec<MonthRow>,
    pub categories: BTreeMap<String, Decimal>,
}

/// Computes pillar totals, account balances, monthly cash flow, the spending
/// breakdown and the health score over every recorded transaction, all in the
/// preferred display currency.
pub async fn dashboard(config: Config) -> Result<Out<Dashboard>> {
    let transactions = config.db().transactions(&TransactionFilter::default()).await?;
    let ctx = display_context(&config).await;

    let totals = report::pillar_totals(&transactions, &ctx);
    let health_score = report::health_score(&totals);
    let health_status = report::health_status(health_score);
    let accounts = report::account_balances(&transactions, &ctx);
    let months: Vec<MonthRow> = report::monthly_cash_flow(&transactions, &ctx)
        .into_iter()
        .map(|((year, month), MonthFlow { earn, spend })| MonthRow {
            year,
            month,
            earn,
            spend,
        })
        .collect();
    let categories = report::category_breakdown(&transactions, &ctx);

    let mut lines = vec![format!("Dashboard ({})", ctx.currency())];
    lines.push(String::new());
    for pillar in Pillar::ALL {
        lines.push(format!(
            "  {:<7} {:>15}",
            pillar.to_string(),
            ctx.format(totals.get(pillar))
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "Health score: {} ({health_status})",
        health_score.round_dp(0)
    ));

    if !accounts.is_empty() {
        lines.push(String::new());
        lines.push("Accounts:".to_string());
        for (account, balance) in &accounts {
            let name = if account.is_empty() { "(none)" } else { account };
            lines.push(format!("  {:<20} {:>15}", name, ctx.format(*balance)));
        }
    }

    if !months.is_empty() {
        lines.push(String::new());
        lines.push("Monthly cash flow:".to_string());
        for row in &months {
            lines.push(format!(
                "  {}-{:02}  earned {:>15}  spent {:>15}",
                row.year,
                row.month,
                ctx.format(row.earn),
                ctx.format(row.spend)
            ));
        }
    }

    if !categories.is_empty() {
        lines.push(String::new());
        lines.push("Spending by category:".to_string());
        for (category, total) in &categories {
            lines.push(format!("  {:<20} {:>15}", category, ctx.format(*total)));
        }
    }

    let data = Dashboard {
        currency: ctx.currency().to_string(),
        totals,
        health_score,
        health_status,
        accounts,
        months,
        categories,
    };
    Ok(Out::new(lines.join("\n"), data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_dashboard_aggregates() {
        let env = TestEnv::new().await;
        env.insert_transaction("2026-01-05", "100000", Pillar::Earn, "Bank", "")
            .await;
        env.insert_transaction("2026-01-10", "50000", Pillar::Spend, "Bank", "Food")
            .await;
        env.insert_transaction("2026-02-01", "25000", Pillar::Save, "Bank", "")
            .await;
        env.insert_transaction("2026-02-15", "10000", Pillar::Spend, "Bank", "")
            .await;

        let out = dashboard(env.config()).await.unwrap();
        let data = out.structure().unwrap();

        assert_eq!(data.currency, "COP");
        assert_eq!(data.totals.earn, Decimal::from(100_000));
        assert_eq!(data.totals.spend, Decimal::from(60_000));
        assert_eq!(data.totals.save, Decimal::from(25_000));
        assert_eq!(data.health_score, Decimal::from(25));
        assert_eq!(data.health_status, HealthStatus::Stable);
        // Earn in, Spend and Save out.
        assert_eq!(data.accounts["Bank"], Decimal::from(15_000));
        assert_eq!(data.months.len(), 2);
        assert_eq!(data.months[1].earn, Decimal::ZERO);
        assert_eq!(data.months[1].spend, Decimal::from(10_000));
        assert_eq!(data.categories["Food"], Decimal::from(50_000));
        assert_eq!(data.categories["Other"], Decimal::from(10_000));
        assert!(out.message().contains("Health score: 25"));
    }

    #[tokio::test]
    async fn test_dashboard_cash_flow_excludes_savings() {
        let env = TestEnv::new().await;
        env.insert_transaction("2026-01-05", "100000", Pillar::Earn, "Bank", "")
            .await;
        // Save and Invest are not cash flow; February must not appear.
        env.insert_transaction("2026-02-01", "25000", Pillar::Save, "Bank", "")
            .await;

        let out = dashboard(env.config()).await.unwrap();
        let data = out.structure().unwrap();
        assert_eq!(data.months.len(), 1);
        assert_eq!(data.months[0].year, 2026);
        assert_eq!(data.months[0].month, 1);
        assert_eq!(data.months[0].earn, Decimal::from(100_000));
        assert_eq!(data.months[0].spend, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_dashboard_empty_database() {
        let env = TestEnv::new().await;
        let out = dashboard(env.config()).await.unwrap();
        let data = out.structure().unwrap();
        assert_eq!(data.totals, PillarTotals::default());
        assert_eq!(data.health_score, Decimal::ZERO);
        assert_eq!(data.health_status, HealthStatus::Critical);
        assert!(data.months.is_empty());
    }
}
