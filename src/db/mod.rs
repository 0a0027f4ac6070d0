//! The SQLite record store: transactions, goals, the profile row and the rate cache.

use crate::model::{Amount, Goal, Pillar, Profile, Transaction, TransactionFilter};
use crate::rates::{CachedRates, RateMatrix, RateStore};
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS transactions (
        id TEXT PRIMARY KEY,
        date TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        amount TEXT NOT NULL,
        pillar TEXT NOT NULL,
        account TEXT NOT NULL DEFAULT '',
        category TEXT NOT NULL DEFAULT '',
        tag TEXT NOT NULL DEFAULT '',
        original_currency TEXT,
        original_amount TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date)",
    "CREATE TABLE IF NOT EXISTS goals (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        target_amount TEXT NOT NULL,
        current_amount TEXT NOT NULL,
        deadline TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS profile (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        full_name TEXT NOT NULL DEFAULT '',
        onboarding_completed INTEGER NOT NULL DEFAULT 0,
        currency TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS rate_cache (
        pivot TEXT PRIMARY KEY,
        rates TEXT NOT NULL,
        fetched_at INTEGER NOT NULL
    )",
];

/// Handle to the SQLite database. Cheap to clone; all clones share one pool.
#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Creates a new SQLite file at `path` and initializes the schema. Errors if a
    /// file already exists there.
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database file already exists at '{}'", path.display());
        }
        let db = Self::connect(path, true).await?;
        db.apply_schema().await?;
        Ok(db)
    }

    /// Opens an existing SQLite file at `path`, applying any missing schema.
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        let db = Self::connect(path, false).await?;
        db.apply_schema().await?;
        Ok(db)
    }

    async fn connect(path: &Path, create: bool) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to open SQLite database at {}", path.display()))?;
        Ok(Self { pool })
    }

    async fn apply_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Unable to apply database schema")?;
        }
        Ok(())
    }

    // -- transactions --------------------------------------------------------

    pub(crate) async fn insert_transaction(&self, transaction: &Transaction) -> Result<()> {
        sqlx::query(
            "INSERT INTO transactions
                (id, date, description, amount, pillar, account, category, tag,
                 original_currency, original_amount)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(transaction.id())
        .bind(transaction.date().to_string())
        .bind(transaction.description())
        .bind(transaction.amount().value().to_string())
        .bind(transaction.pillar().to_string())
        .bind(transaction.account())
        .bind(transaction.category())
        .bind(transaction.tag())
        .bind(transaction.original_currency())
        .bind(transaction.original_amount().map(|a| a.value().to_string()))
        .execute(&self.pool)
        .await
        .context("Unable to insert transaction")?;
        Ok(())
    }

    pub(crate) async fn update_transaction(&self, transaction: &Transaction) -> Result<()> {
        let result = sqlx::query(
            "UPDATE transactions SET
                date = ?, description = ?, amount = ?, pillar = ?, account = ?,
                category = ?, tag = ?, original_currency = ?, original_amount = ?
             WHERE id = ?",
        )
        .bind(transaction.date().to_string())
        .bind(transaction.description())
        .bind(transaction.amount().value().to_string())
        .bind(transaction.pillar().to_string())
        .bind(transaction.account())
        .bind(transaction.category())
        .bind(transaction.tag())
        .bind(transaction.original_currency())
        .bind(transaction.original_amount().map(|a| a.value().to_string()))
        .bind(transaction.id())
        .execute(&self.pool)
        .await
        .context("Unable to update transaction")?;
        if result.rows_affected() == 0 {
            bail!("No transaction found with id '{}'", transaction.id());
        }
        Ok(())
    }

    pub(crate) async fn delete_transaction(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Unable to delete transaction")?;
        if result.rows_affected() == 0 {
            bail!("No transaction found with id '{id}'");
        }
        Ok(())
    }

    pub(crate) async fn get_transaction(&self, id: &str) -> Result<Option<Transaction>> {
        let row = sqlx::query("SELECT * FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Unable to fetch transaction")?;
        row.as_ref().map(transaction_from_row).transpose()
    }

    /// Fetches transactions matching `filter`, ordered by date. Category matches
    /// exactly, tag as a substring, and the date range is inclusive at both ends.
    pub(crate) async fn transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut sql = String::from("SELECT * FROM transactions WHERE 1=1");
        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if filter.tag.is_some() {
            sql.push_str(" AND tag LIKE ?");
        }
        if filter.start_date.is_some() {
            sql.push_str(" AND date >= ?");
        }
        if filter.end_date.is_some() {
            sql.push_str(" AND date <= ?");
        }
        sql.push_str(" ORDER BY date ASC, id ASC");

        let mut query = sqlx::query(&sql);
        if let Some(category) = &filter.category {
            query = query.bind(category);
        }
        if let Some(tag) = &filter.tag {
            query = query.bind(format!("%{tag}%"));
        }
        if let Some(start) = filter.start_date {
            query = query.bind(start.to_string());
        }
        if let Some(end) = filter.end_date {
            query = query.bind(end.to_string());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Unable to fetch transactions")?;
        rows.iter().map(transaction_from_row).collect()
    }

    // -- goals ---------------------------------------------------------------

    pub(crate) async fn insert_goal(&self, goal: &Goal) -> Result<()> {
        sqlx::query(
            "INSERT INTO goals (id, name, target_amount, current_amount, deadline)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(goal.id())
        .bind(goal.name())
        .bind(goal.target_amount().value().to_string())
        .bind(goal.current_amount().value().to_string())
        .bind(goal.deadline().to_string())
        .execute(&self.pool)
        .await
        .context("Unable to insert goal")?;
        Ok(())
    }

    pub(crate) async fn update_goal(&self, goal: &Goal) -> Result<()> {
        let result = sqlx::query(
            "UPDATE goals SET name = ?, target_amount = ?, current_amount = ?, deadline = ?
             WHERE id = ?",
        )
        .bind(goal.name())
        .bind(goal.target_amount().value().to_string())
        .bind(goal.current_amount().value().to_string())
        .bind(goal.deadline().to_string())
        .bind(goal.id())
        .execute(&self.pool)
        .await
        .context("Unable to update goal")?;
        if result.rows_affected() == 0 {
            bail!("No goal found with id '{}'", goal.id());
        }
        Ok(())
    }

    pub(crate) async fn delete_goal(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM goals WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Unable to delete goal")?;
        if result.rows_affected() == 0 {
            bail!("No goal found with id '{id}'");
        }
        Ok(())
    }

    pub(crate) async fn get_goal(&self, id: &str) -> Result<Option<Goal>> {
        let row = sqlx::query("SELECT * FROM goals WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Unable to fetch goal")?;
        row.as_ref().map(goal_from_row).transpose()
    }

    /// All goals, soonest deadline first.
    pub(crate) async fn goals(&self) -> Result<Vec<Goal>> {
        let rows = sqlx::query("SELECT * FROM goals ORDER BY deadline ASC, id ASC")
            .fetch_all(&self.pool)
            .await
            .context("Unable to fetch goals")?;
        rows.iter().map(goal_from_row).collect()
    }

    // -- profile -------------------------------------------------------------

    pub(crate) async fn profile(&self) -> Result<Option<Profile>> {
        let row = sqlx::query("SELECT * FROM profile WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .context("Unable to fetch profile")?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(Profile {
            full_name: row.try_get("full_name")?,
            onboarding_completed: row.try_get::<i64, _>("onboarding_completed")? != 0,
            currency: row.try_get("currency")?,
        }))
    }

    pub(crate) async fn save_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            "INSERT INTO profile (id, full_name, onboarding_completed, currency)
             VALUES (1, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                full_name = excluded.full_name,
                onboarding_completed = excluded.onboarding_completed,
                currency = excluded.currency",
        )
        .bind(&profile.full_name)
        .bind(profile.onboarding_completed as i64)
        .bind(&profile.currency)
        .execute(&self.pool)
        .await
        .context("Unable to save profile")?;
        Ok(())
    }
}

/// The rate cache lives in the same SQLite file, one row per pivot.
#[async_trait::async_trait]
impl RateStore for Db {
    async fn get(&self, pivot: &str) -> Result<Option<CachedRates>> {
        let row = sqlx::query("SELECT rates, fetched_at FROM rate_cache WHERE pivot = ?")
            .bind(pivot)
            .fetch_optional(&self.pool)
            .await
            .context("Unable to read the rate cache")?;
        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row.try_get("rates")?;
        let fetched_at_ms: i64 = row.try_get("fetched_at")?;
        // A malformed entry is a cache miss, never fatal.
        match serde_json::from_str::<BTreeMap<String, Decimal>>(&raw) {
            Ok(rates) => Ok(Some(CachedRates {
                matrix: RateMatrix::new(pivot, rates),
                fetched_at_ms,
            })),
            Err(e) => {
                warn!("discarding malformed rate cache entry for {pivot}: {e}");
                Ok(None)
            }
        }
    }

    async fn put(&self, matrix: &RateMatrix, fetched_at_ms: i64) -> Result<()> {
        let rates = serde_json::to_string(matrix.rates())
            .context("Unable to serialize rates for caching")?;
        sqlx::query(
            "INSERT INTO rate_cache (pivot, rates, fetched_at)
             VALUES (?, ?, ?)
             ON CONFLICT(pivot) DO UPDATE SET
                rates = excluded.rates,
                fetched_at = excluded.fetched_at",
        )
        .bind(matrix.pivot())
        .bind(rates)
        .bind(fetched_at_ms)
        .execute(&self.pool)
        .await
        .context("Unable to write the rate cache")?;
        Ok(())
    }
}

fn transaction_from_row(row: &SqliteRow) -> Result<Transaction> {
    let amount: String = row.try_get("amount")?;
    let pillar: String = row.try_get("pillar")?;
    let date: String = row.try_get("date")?;
    let original_amount: Option<String> = row.try_get("original_amount")?;
    Ok(Transaction::from_parts(
        row.try_get("id")?,
        parse_date(&date)?,
        row.try_get("description")?,
        parse_amount(&amount)?,
        Pillar::from_str(&pillar).with_context(|| format!("Invalid pillar '{pillar}'"))?,
        row.try_get("account")?,
        row.try_get("category")?,
        row.try_get("tag")?,
        row.try_get("original_currency")?,
        original_amount.as_deref().map(parse_amount).transpose()?,
    ))
}

fn goal_from_row(row: &SqliteRow) -> Result<Goal> {
    let target: String = row.try_get("target_amount")?;
    let current: String = row.try_get("current_amount")?;
    let deadline: String = row.try_get("deadline")?;
    Ok(Goal::from_parts(
        row.try_get("id")?,
        row.try_get("name")?,
        parse_amount(&target)?,
        parse_amount(&current)?,
        parse_date(&deadline)?,
    ))
}

fn parse_amount(s: &str) -> Result<Amount> {
    Amount::from_str(s).map_err(anyhow::Error::new)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::from_str(s).with_context(|| format!("Invalid stored date '{s}'"))
}
