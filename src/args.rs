//! These structs provide the CLI interface for the pilar CLI.

use crate::model::{Amount, Pillar};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// pilar: A command-line tool for personal finances built on the four-pillar method.
///
/// Transactions are recorded in a local SQLite datastore and classified into one of
/// four pillars: earn, spend, save and invest. From there pilar computes balances,
/// monthly cash flow, spending breakdowns, a financial health score and progress
/// toward savings goals, in whichever display currency you prefer.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration and database.
    ///
    /// This is the first command you should run. By default data lives in $HOME/pilar;
    /// pass --pilar-home (or set PILAR_HOME) to put it somewhere else.
    Init(InitArgs),
    /// Record a new transaction.
    Insert(InsertArgs),
    /// Modify an existing transaction.
    Update(UpdateArgs),
    /// Delete a transaction.
    Delete(DeleteArgs),
    /// List transactions, optionally filtered by category, tag or date range.
    List(ListArgs),
    /// Show pillar totals, account balances, cash flow and the health score.
    Dashboard,
    /// Manage savings goals.
    Goal(GoalArgs),
    /// Project compound growth of an investment with monthly contributions.
    Simulate(SimulateArgs),
    /// Show or change the preferred display currency.
    Currency(CurrencyArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where pilar data and configuration is held. Defaults to ~/pilar
    #[arg(long, env = "PILAR_HOME", default_value_t = default_pilar_home())]
    pilar_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, pilar_home: PathBuf) -> Self {
        Self {
            log_level,
            pilar_home: pilar_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn pilar_home(&self) -> &DisplayPath {
        &self.pilar_home
    }
}

/// Args for the `pilar init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Your name, stored in the local profile.
    #[arg(long)]
    name: String,

    /// The preferred display currency code, e.g. COP, USD, EUR or MXN.
    #[arg(long, default_value = "COP")]
    currency: String,
}

impl InitArgs {
    pub fn new(name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            currency: currency.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

/// Args for the `pilar insert` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    /// The transaction date, e.g. 2026-03-14.
    #[arg(long)]
    date: NaiveDate,

    /// A free-form description.
    #[arg(long, default_value = "")]
    description: String,

    /// The amount in the currency of record, e.g. 85000 or "1,250.75".
    #[arg(long)]
    amount: Amount,

    /// Which pillar the transaction belongs to.
    #[arg(long)]
    pillar: Pillar,

    /// The account the money moved through.
    #[arg(long, default_value = "")]
    account: String,

    /// A spending category, e.g. Restaurants.
    #[arg(long, default_value = "")]
    category: String,

    /// A free-form tag for ad-hoc grouping.
    #[arg(long, default_value = "")]
    tag: String,

    /// The currency the transaction was originally denominated in, if not the
    /// currency of record.
    #[arg(long, requires = "original_amount")]
    original_currency: Option<String>,

    /// The amount in the original currency.
    #[arg(long, requires = "original_currency")]
    original_amount: Option<Amount>,
}

impl InsertArgs {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn pillar(&self) -> Pillar {
        self.pillar
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn original_currency(&self) -> Option<&str> {
        self.original_currency.as_deref()
    }

    pub fn original_amount(&self) -> Option<Amount> {
        self.original_amount
    }
}

/// Args for the `pilar update` command. Only the provided fields change.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// The id of the transaction to modify.
    #[arg(long)]
    id: String,

    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    amount: Option<Amount>,

    #[arg(long)]
    pillar: Option<Pillar>,

    #[arg(long)]
    account: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    tag: Option<String>,
}

impl UpdateArgs {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn pillar(&self) -> Option<Pillar> {
        self.pillar
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}

/// Args for the `pilar delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the transaction to delete.
    #[arg(long)]
    id: String,
}

impl DeleteArgs {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Args for the `pilar list` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ListArgs {
    /// Only transactions with exactly this category.
    #[arg(long)]
    category: Option<String>,

    /// Only transactions whose tag contains this text.
    #[arg(long)]
    tag: Option<String>,

    /// Only transactions on or after this date.
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Only transactions on or before this date.
    #[arg(long)]
    end_date: Option<NaiveDate>,
}

impl ListArgs {
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }
}

/// Args for the `pilar goal` command.
#[derive(Debug, Parser, Clone)]
pub struct GoalArgs {
    #[command(subcommand)]
    command: GoalCommand,
}

impl GoalArgs {
    pub fn command(&self) -> &GoalCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum GoalCommand {
    /// Create a savings goal.
    Add(GoalAddArgs),
    /// Update a goal's saved amount or details.
    Update(GoalUpdateArgs),
    /// List goals with progress and a projected completion horizon.
    List,
    /// Delete a goal.
    Delete(GoalDeleteArgs),
}

/// Args for the `pilar goal add` command.
#[derive(Debug, Parser, Clone)]
pub struct GoalAddArgs {
    /// A short name for the goal, e.g. "Emergency fund".
    #[arg(long)]
    name: String,

    /// The target amount in the currency of record.
    #[arg(long)]
    target: Amount,

    /// The amount already saved toward the goal.
    #[arg(long, default_value = "0")]
    current: Amount,

    /// The date you want to reach the goal by, e.g. 2027-06-30.
    #[arg(long)]
    deadline: NaiveDate,
}

impl GoalAddArgs {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> Amount {
        self.target
    }

    pub fn current(&self) -> Amount {
        self.current
    }

    pub fn deadline(&self) -> NaiveDate {
        self.deadline
    }
}

/// Args for the `pilar goal update` command. Only the provided fields change.
#[derive(Debug, Parser, Clone)]
pub struct GoalUpdateArgs {
    /// The id of the goal to modify.
    #[arg(long)]
    id: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    target: Option<Amount>,

    #[arg(long)]
    current: Option<Amount>,

    #[arg(long)]
    deadline: Option<NaiveDate>,
}

impl GoalUpdateArgs {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn target(&self) -> Option<Amount> {
        self.target
    }

    pub fn current(&self) -> Option<Amount> {
        self.current
    }

    pub fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }
}

/// Args for the `pilar goal delete` command.
#[derive(Debug, Parser, Clone)]
pub struct GoalDeleteArgs {
    /// The id of the goal to delete.
    #[arg(long)]
    id: String,
}

impl GoalDeleteArgs {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Args for the `pilar simulate` command.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// The starting amount invested.
    #[arg(long, default_value = "1000000")]
    initial: Amount,

    /// The amount contributed each month.
    #[arg(long, default_value = "200000")]
    monthly: Amount,

    /// The annual effective interest rate, as a percentage.
    #[arg(long, default_value = "10")]
    rate: Decimal,

    /// How many years to project.
    #[arg(long, default_value_t = 10)]
    years: u32,
}

impl SimulateArgs {
    pub fn initial(&self) -> Amount {
        self.initial
    }

    pub fn monthly(&self) -> Amount {
        self.monthly
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn years(&self) -> u32 {
        self.years
    }
}

/// Args for the `pilar currency` command.
#[derive(Debug, Parser, Clone)]
pub struct CurrencyArgs {
    #[command(subcommand)]
    command: CurrencyCommand,
}

impl CurrencyArgs {
    pub fn command(&self) -> &CurrencyCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CurrencyCommand {
    /// Show the preferred display currency and the available currencies.
    Show,
    /// Change the preferred display currency.
    Set(CurrencySetArgs),
}

/// Args for the `pilar currency set` command.
#[derive(Debug, Parser, Clone)]
pub struct CurrencySetArgs {
    /// The currency code to switch to, e.g. COP, USD, EUR or MXN.
    currency: String,
}

impl CurrencySetArgs {
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

fn default_pilar_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("pilar"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --pilar-home or PILAR_HOME instead of relying on the default \
                pilar home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("pilar")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        <Args as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_insert_args() {
        let args = Args::try_parse_from([
            "pilar",
            "insert",
            "--date",
            "2026-03-14",
            "--amount",
            "85,000.50",
            "--pillar",
            "spend",
            "--category",
            "Restaurants",
        ])
        .unwrap();
        let Command::Insert(insert) = args.command() else {
            panic!("expected insert");
        };
        assert_eq!(insert.amount(), Amount::from_str("85000.50").unwrap());
        assert_eq!(insert.pillar(), Pillar::Spend);
        assert_eq!(insert.category(), "Restaurants");
        assert_eq!(insert.tag(), "");
    }

    #[test]
    fn test_original_currency_requires_amount() {
        let result = Args::try_parse_from([
            "pilar",
            "insert",
            "--date",
            "2026-03-14",
            "--amount",
            "100",
            "--pillar",
            "spend",
            "--original-currency",
            "USD",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_currency_set() {
        let args = Args::try_parse_from(["pilar", "currency", "set", "USD"]).unwrap();
        let Command::Currency(currency) = args.command() else {
            panic!("expected currency");
        };
        let CurrencyCommand::Set(set) = currency.command() else {
            panic!("expected set");
        };
        assert_eq!(set.currency(), "USD");
    }
}
