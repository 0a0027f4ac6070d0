//! Configuration file handling for Pilar.
//!
//! The configuration file is stored at `$PILAR_HOME/config.json` and contains the
//! preferred display currency and, optionally, the exchange rate API key.

use crate::db::Db;
use crate::rates::{ExchangeRateApi, RateProvider};
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "pilar";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const PILAR_SQLITE: &str = "pilar.sqlite";

/// Environment variable consulted when `rate_api_key` is absent from the config file.
pub const RATE_API_KEY_ENV: &str = "EXCHANGE_RATE_API_KEY";

/// The `Config` object represents the configuration of the app. You instantiate it by
/// providing the path to `$PILAR_HOME` and from there it loads `$PILAR_HOME/config.json`
/// and opens the SQLite database that lives alongside it.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
    /// Resolved once at construction from the config file or the environment, so the
    /// ambient environment cannot leak into an already-built `Config`.
    rate_api_key: Option<String>,
}

impl Config {
    /// Creates the data directory, writes an initial `config.json` with `currency` as the
    /// display currency, and initializes the SQLite database.
    pub async fn create(dir: impl Into<PathBuf>, currency: &str) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the pilar home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            currency: currency.to_string(),
            rate_api_key: None,
        };
        config_file.save(&config_path).await?;

        let sqlite_path = root.join(PILAR_SQLITE);
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        let rate_api_key = resolve_rate_api_key(&config_file);
        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
            rate_api_key,
        })
    }

    /// Validates that `pilar_home` exists, loads the config file and opens the database.
    pub async fn load(pilar_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = pilar_home.into();
        let root = utils::canonicalize(&maybe_relative).await?;
        let _ = utils::read_dir(&root).await.context("Pilar Home is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = root.join(PILAR_SQLITE);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        let rate_api_key = resolve_rate_api_key(&config_file);
        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
            rate_api_key,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    /// The preferred display currency code, e.g. "COP".
    pub fn currency(&self) -> &str {
        &self.config_file.currency
    }

    /// Updates the display currency and persists the config file.
    pub async fn set_currency(&mut self, currency: &str) -> Result<()> {
        self.config_file.currency = currency.to_string();
        self.config_file.save(&self.config_path).await
    }

    /// The exchange rate API key, resolved from the config file or the environment
    /// when the `Config` was built.
    pub fn rate_api_key(&self) -> Option<String> {
        self.rate_api_key.clone()
    }

    /// Drops the resolved API key so tests never reach the network, regardless of
    /// what is set in the surrounding environment.
    #[cfg(test)]
    pub(crate) fn clear_rate_api_key(&mut self) {
        self.rate_api_key = None;
    }

    /// Builds a `RateProvider` backed by the HTTP rate source and the database cache.
    pub fn rate_provider(&self) -> RateProvider {
        RateProvider::new(
            Box::new(ExchangeRateApi::new(self.rate_api_key())),
            Box::new(self.db.clone()),
        )
    }
}

fn resolve_rate_api_key(config_file: &ConfigFile) -> Option<String> {
    config_file
        .rate_api_key
        .clone()
        .or_else(|| std::env::var(RATE_API_KEY_ENV).ok())
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "pilar",
///   "config_version": 1,
///   "currency": "COP",
///   "rate_api_key": "0123456789abcdef"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "pilar"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Preferred display currency code
    currency: String,

    /// API key for the exchange rate service (optional, may also come from the
    /// EXCHANGE_RATE_API_KEY environment variable)
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_api_key: Option<String>,
}

impl ConfigFile {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path.as_ref(), data)
            .await
            .context("Unable to write config file")
    }
}
