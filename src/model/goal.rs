//! Savings goal records.

use crate::model::Amount;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A savings goal. Progress is a pure function of `current_amount` against
/// `target_amount`; it is not derived from transaction history (projection is, see
/// `report::goal_projection`).
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Goal {
    id: String,
    name: String,
    target_amount: Amount,
    current_amount: Amount,
    deadline: NaiveDate,
}

impl Goal {
    pub fn new(
        name: impl Into<String>,
        target_amount: Amount,
        current_amount: Amount,
        deadline: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            target_amount,
            current_amount,
            deadline,
        }
    }

    pub(crate) fn from_parts(
        id: String,
        name: String,
        target_amount: Amount,
        current_amount: Amount,
        deadline: NaiveDate,
    ) -> Self {
        Self {
            id,
            name,
            target_amount,
            current_amount,
            deadline,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_amount(&self) -> Amount {
        self.target_amount
    }

    pub fn current_amount(&self) -> Amount {
        self.current_amount
    }

    pub fn deadline(&self) -> NaiveDate {
        self.deadline
    }

    /// The amount still needed to reach the target, floored at zero.
    pub fn remaining(&self) -> Decimal {
        (self.target_amount.value() - self.current_amount.value()).max(Decimal::ZERO)
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_target_amount(&mut self, target_amount: Amount) {
        self.target_amount = target_amount;
    }

    pub(crate) fn set_current_amount(&mut self, current_amount: Amount) {
        self.current_amount = current_amount;
    }

    pub(crate) fn set_deadline(&mut self, deadline: NaiveDate) {
        self.deadline = deadline;
    }
}
