//! Transaction records and the filter used when querying them.

use crate::convert::CURRENCY_OF_RECORD;
use crate::model::{Amount, Pillar};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single recorded transaction.
///
/// `amount` is the ground-truth value for all aggregation. When the user transacted
/// in a currency other than the currency of record, `original_currency` names it and
/// `original_amount` preserves the value as entered; legacy records carry neither and
/// are treated as being in the currency of record.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    id: String,
    date: NaiveDate,
    description: String,
    amount: Amount,
    pillar: Pillar,
    account: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_amount: Option<Amount>,
}

impl Transaction {
    /// Creates a new transaction with a generated id.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Amount,
        pillar: Pillar,
        account: impl Into<String>,
        category: impl Into<String>,
        tag: impl Into<String>,
        original_currency: Option<String>,
        original_amount: Option<Amount>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            description: description.into(),
            amount,
            pillar,
            account: account.into(),
            category: category.into(),
            tag: tag.into(),
            original_currency,
            original_amount,
        }
    }

    /// Reconstructs a transaction from stored fields, preserving its id.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: String,
        date: NaiveDate,
        description: String,
        amount: Amount,
        pillar: Pillar,
        account: String,
        category: String,
        tag: String,
        original_currency: Option<String>,
        original_amount: Option<Amount>,
    ) -> Self {
        Self {
            id,
            date,
            description,
            amount,
            pillar,
            account,
            category,
            tag,
            original_currency,
            original_amount,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

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

    /// The currency `amount` is expressed in. Legacy records without an original
    /// currency default to the currency of record.
    pub fn source_currency(&self) -> &str {
        self.original_currency
            .as_deref()
            .unwrap_or(CURRENCY_OF_RECORD)
    }

    pub(crate) fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub(crate) fn set_amount(&mut self, amount: Amount) {
        self.amount = amount;
    }

    pub(crate) fn set_pillar(&mut self, pillar: Pillar) {
        self.pillar = pillar;
    }

    pub(crate) fn set_account(&mut self, account: String) {
        self.account = account;
    }

    pub(crate) fn set_category(&mut self, category: String) {
        self.category = category;
    }

    pub(crate) fn set_tag(&mut self, tag: String) {
        self.tag = tag;
    }
}

/// Criteria for querying transactions from the record store. Empty filter matches all.
///
/// Category matches exactly, tag matches as a substring, and the date range is
/// inclusive at both ends.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TransactionFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.tag.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn transaction(original_currency: Option<&str>) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            "Groceries",
            Amount::from_str("120000").unwrap(),
            Pillar::Spend,
            "Cash",
            "Food",
            "",
            original_currency.map(String::from),
            None,
        )
    }

    #[test]
    fn test_source_currency_defaults_to_currency_of_record() {
        let t = transaction(None);
        assert_eq!(t.source_currency(), CURRENCY_OF_RECORD);
    }

    #[test]
    fn test_source_currency_uses_original() {
        let t = transaction(Some("USD"));
        assert_eq!(t.source_currency(), "USD");
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(transaction(None).id(), transaction(None).id());
    }
}
