//! The four economic pillars that classify every transaction.

use serde::{Deserialize, Serialize};

/// Classifies a transaction's economic direction.
///
/// `Earn` is an inflow into an account; the other three are outflows from an account.
/// `Save` and `Invest` nonetheless count as positive contributions toward the
/// financial-health score (see `report::health_score`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Earn,
    Spend,
    Save,
    Invest,
}

serde_plain::derive_display_from_serialize!(Pillar);
serde_plain::derive_fromstr_from_deserialize!(Pillar);

impl Pillar {
    pub const ALL: [Pillar; 4] = [Pillar::Earn, Pillar::Spend, Pillar::Save, Pillar::Invest];
}
