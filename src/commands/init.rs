use crate::args::InitArgs;
use crate::commands::Out;
use crate::convert::{is_supported_currency, AVAILABLE_CURRENCIES};
use crate::model::Profile;
use crate::{Config, Result};
use anyhow::{bail, Context};
use std::path::Path;

/// Creates the data directory with an initial `config.json`, an empty SQLite database
/// and the user profile row.
///
/// # Arguments
/// - `pilar_home` - The directory that will be the root of the data directory, e.g.
///   `$HOME/pilar`
/// - `args` - The user's name and preferred display currency.
///
/// # Errors
/// - Returns an error if the currency is not supported or if any file operations fail.
pub async fn init(pilar_home: &Path, args: &InitArgs) -> Result<Out<()>> {
    if !is_supported_currency(args.currency()) {
        bail!(
            "'{}' is not a supported currency. Available: {}",
            args.currency(),
            supported_codes()
        );
    }

    let config = Config::create(pilar_home, args.currency())
        .await
        .context("Unable to create the data directory and configs")?;
    config
        .db()
        .save_profile(&Profile::new(args.name(), args.currency()))
        .await?;

    Ok(format!(
        "Successfully created the pilar directory at '{}' for {} ({})",
        config.root().display(),
        args.name(),
        args.currency()
    )
    .into())
}

pub(crate) fn supported_codes() -> String {
    AVAILABLE_CURRENCIES
        .iter()
        .map(|c| c.code)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_home_and_profile() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("pilar");
        let args = InitArgs::new("Ana", "COP");
        init(&home, &args).await.unwrap();

        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.currency(), "COP");
        let profile = config.db().profile().await.unwrap().unwrap();
        assert_eq!(profile.full_name, "Ana");
        assert!(profile.onboarding_completed);
    }

    #[tokio::test]
    async fn test_init_rejects_unknown_currency() {
        let dir = TempDir::new().unwrap();
        let args = InitArgs::new("Ana", "XYZ");
        let err = init(&dir.path().join("pilar"), &args).await.unwrap_err();
        assert!(err.to_string().contains("not a supported currency"));
    }

    #[tokio::test]
    async fn test_init_refuses_existing_home() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("pilar");
        init(&home, &InitArgs::new("Ana", "COP")).await.unwrap();
        let result = init(&home, &InitArgs::new("Ana", "COP")).await;
        assert!(result.is_err());
    }
}
