//! The single local user profile.

use serde::{Deserialize, Serialize};

/// The user profile row. There is exactly one per pilar home directory.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Profile {
    pub full_name: String,
    pub onboarding_completed: bool,
    /// The preferred display currency code, e.g. "COP" or "USD".
    pub currency: String,
}

impl Profile {
    pub fn new(full_name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            onboarding_completed: true,
            currency: currency.into(),
        }
    }
}
