//! Compound growth simulator command handler.

use crate::args::SimulateArgs;
use crate::commands::Out;
use crate::convert::format_amount;
use crate::report::{self, YearSnapshot};
use crate::{Config, Result};
use rust_decimal::Decimal;
use serde::Serialize;

/// A compound growth projection with its inputs and summary totals.
#[derive(Debug, Clone, Serialize)]
pub struct Simulation {
    pub currency: String,
    pub initial: Decimal,
    pub monthly_contribution: Decimal,
    pub annual_rate_percent: Decimal,
    pub years: u32,
    pub snapshots: Vec<YearSnapshot>,
    pub total_invested: Decimal,
    pub total_interest: Decimal,
    pub final_balance: Decimal,
}

/// Projects compound growth of an initial amount plus monthly contributions at the
/// given annual rate, with a yearly invested/interest/balance table. Pure arithmetic
/// in the preferred display currency; no exchange rates are involved.
pub async fn simulate(config: Config, args: &SimulateArgs) -> Result<Out<Simulation>> {
    let snapshots = report::compound_growth(
        args.initial().value(),
        args.monthly().value(),
        args.rate(),
        args.years(),
    );
    let last = snapshots.last().cloned().unwrap_or(YearSnapshot {
        year: 0,
        invested: args.initial().value(),
        interest: Decimal::ZERO,
        balance: args.initial().value(),
    });

    let currency = config.currency().to_string();
    let fmt = |value: Decimal| format_amount(value, &currency);

    let mut lines = vec![format!(
        "Compound growth: {} initial + {}/month at {}% for {} year(s) ({currency})",
        fmt(args.initial().value()),
        fmt(args.monthly().value()),
        args.rate(),
        args.years()
    )];
    for snapshot in &snapshots {
        lines.push(format!(
            "  Year {:>2}  invested {:>15}  interest {:>15}  balance {:>15}",
            snapshot.year,
            fmt(snapshot.invested),
            fmt(snapshot.interest),
            fmt(snapshot.balance)
        ));
    }
    lines.push(format!(
        "Total invested {} | Interest earned +{} | Final balance {}",
        fmt(last.invested),
        fmt(last.interest),
        fmt(last.balance)
    ));

    let data = Simulation {
        currency,
        initial: args.initial().value(),
        monthly_contribution: args.monthly().value(),
        annual_rate_percent: args.rate(),
        years: args.years(),
        snapshots,
        total_invested: last.invested,
        total_interest: last.interest,
        final_balance: last.balance,
    };
    Ok(Out::new(lines.join("\n"), data))
}
