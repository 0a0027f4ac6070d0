//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{Amount, Goal, Pillar, Profile, Transaction};
use crate::Config;
use chrono::NaiveDate;
use std::str::FromStr;
use tempfile::TempDir;

/// Test environment that sets up a pilar home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config, initialized database and a profile row.
    /// The display currency starts as the currency of record.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("pilar");
        let mut config = Config::create(&root, "COP").await.unwrap();
        // An ambient EXCHANGE_RATE_API_KEY must not let tests reach the network.
        config.clear_rate_api_key();
        config
            .db()
            .save_profile(&Profile::new("Test User", "COP"))
            .await
            .unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Inserts a transaction in the currency of record and returns its id.
    pub async fn insert_transaction(
        &self,
        date: &str,
        amount: &str,
        pillar: Pillar,
        account: &str,
        category: &str,
    ) -> String {
        let transaction = Transaction::new(
            NaiveDate::from_str(date).unwrap(),
            "test transaction",
            Amount::from_str(amount).unwrap(),
            pillar,
            account,
            category,
            "",
            None,
            None,
        );
        self.config
            .db()
            .insert_transaction(&transaction)
            .await
            .unwrap();
        transaction.id().to_string()
    }

    /// Inserts a goal and returns its id.
    pub async fn insert_goal(
        &self,
        name: &str,
        target: &str,
        current: &str,
        deadline: &str,
    ) -> String {
        let goal = Goal::new(
            name,
            Amount::from_str(target).unwrap(),
            Amount::from_str(current).unwrap(),
            NaiveDate::from_str(deadline).unwrap(),
        );
        self.config.db().insert_goal(&goal).await.unwrap();
        goal.id().to_string()
    }
}
