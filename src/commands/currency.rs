//! Currency preference command handlers.

use crate::commands::init::supported_codes;
use crate::commands::Out;
use crate::convert::{is_supported_currency, AVAILABLE_CURRENCIES};
use crate::{Config, Result};
use anyhow::bail;

/// Shows the preferred display currency and the available choices.
pub async fn currency_show(config: Config) -> Result<Out<String>> {
    let current = config.currency().to_string();
    let mut lines = Vec::with_capacity(AVAILABLE_CURRENCIES.len());
    for info in AVAILABLE_CURRENCIES {
        let marker = if info.code == current { "*" } else { " " };
        lines.push(format!("{marker} {}  {}", info.code, info.label));
    }
    Ok(Out::new(lines.join("\n"), current))
}

/// Changes the preferred display currency, updating both the config file and the
/// profile row.
pub async fn currency_set(mut config: Config, currency: &str) -> Result<Out<String>> {
    if !is_supported_currency(currency) {
        bail!(
            "'{currency}' is not a supported currency. Available: {}",
            supported_codes()
        );
    }

    config.set_currency(currency).await?;
    if let Some(mut profile) = config.db().profile().await? {
        profile.currency = currency.to_string();
        config.db().save_profile(&profile).await?;
    }

    let message = format!("Display currency set to {currency}");
    Ok(Out::new(message, currency.to_string()))
}
