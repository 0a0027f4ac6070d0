//! Cross-currency conversion and display formatting.
//!
//! Conversion is pivot-agnostic: `(amount / rates[from]) * rates[to]` divides out
//! whatever currency the matrix happens to be pivoted at, so callers never need to
//! know which pivot the provider ended up with. Data-quality problems (empty matrix,
//! missing rate) degrade to the unconverted amount with a logged warning; conversion
//! never fails and never fabricates a rate.

use crate::model::Transaction;
use crate::rates::RateMatrix;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::warn;

/// The canonical currency transactions are stored in. Records without an original
/// currency are treated as this.
pub const CURRENCY_OF_RECORD: &str = "COP";

/// Display precision for converted amounts.
const DISPLAY_DECIMALS: u32 = 2;

/// The result of a conversion, tagged with whether a rate was actually applied so
/// presentation can flag degraded values instead of silently showing the wrong
/// currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "value")]
pub enum Conversion {
    /// The amount was converted (or no conversion was needed).
    Converted(Decimal),
    /// A rate was unavailable; the amount is unchanged and still in its source
    /// currency.
    Unconverted(Decimal),
}

impl Conversion {
    pub fn value(&self) -> Decimal {
        match self {
            Conversion::Converted(v) | Conversion::Unconverted(v) => *v,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Conversion::Unconverted(_))
    }
}

/// Converts `amount` from `from` to `to` using `matrix`, reporting whether a rate was
/// applied.
///
/// Intermediate math runs at full precision; only the final result is rounded to two
/// decimal places. Equal currencies short-circuit to the exact input.
pub fn convert_tagged(amount: Decimal, from: &str, to: &str, matrix: &RateMatrix) -> Conversion {
    if from == to {
        return Conversion::Converted(amount);
    }

    let Some(from_rate) = matrix.rate(from) else {
        warn!("no exchange rate for {from}; returning amount unconverted");
        return Conversion::Unconverted(amount);
    };
    let Some(to_rate) = matrix.rate(to) else {
        warn!("no exchange rate for {to}; returning amount unconverted");
        return Conversion::Unconverted(amount);
    };
    if from_rate.is_zero() {
        warn!("exchange rate for {from} is zero; returning amount unconverted");
        return Conversion::Unconverted(amount);
    }

    let converted = (amount / from_rate * to_rate)
        .round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    Conversion::Converted(converted)
}

/// Converts `amount` from `from` to `to`, collapsing the degraded case to the
/// unconverted amount. See [`convert_tagged`] when the caller needs to know.
pub fn convert(amount: Decimal, from: &str, to: &str, matrix: &RateMatrix) -> Decimal {
    convert_tagged(amount, from, to, matrix).value()
}

/// A display currency plus the rate matrix snapshot captured for one aggregation
/// pass. Holding both in one immutable value means a currency switch mid-computation
/// cannot mix rates; the next pass simply captures a new context.
#[derive(Debug, Clone)]
pub struct DisplayContext {
    currency: String,
    matrix: RateMatrix,
}

impl DisplayContext {
    pub fn new(currency: impl Into<String>, matrix: RateMatrix) -> Self {
        Self {
            currency: currency.into(),
            matrix,
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn matrix(&self) -> &RateMatrix {
        &self.matrix
    }

    /// Converts a raw amount from `source` into the display currency.
    pub fn convert_from(&self, amount: Decimal, source: &str) -> Decimal {
        convert(amount, source, &self.currency, &self.matrix)
    }

    /// Converts a transaction's ground-truth amount into the display currency.
    pub fn convert_transaction(&self, transaction: &Transaction) -> Decimal {
        self.convert_from(
            transaction.amount().value(),
            transaction.source_currency(),
        )
    }

    /// Formats an already-converted amount in the display currency.
    pub fn format(&self, amount: Decimal) -> String {
        format_amount(amount, &self.currency)
    }

    /// Convert-then-format in one call.
    pub fn format_from(&self, amount: Decimal, source: &str) -> String {
        self.format(self.convert_from(amount, source))
    }
}

/// Display configuration for a supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub locale: &'static str,
    pub label: &'static str,
    symbol: &'static str,
    /// Fraction digits shown. The currency of record is conventionally written
    /// without decimals.
    decimals: u32,
    thousands: char,
    decimal_sep: char,
}

/// Currencies selectable as the display preference. The first entry is the default
/// used when an unknown code is encountered.
pub const AVAILABLE_CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo {
        code: "COP",
        locale: "es-CO",
        label: "Colombian Peso ($)",
        symbol: "$",
        decimals: 0,
        thousands: '.',
        decimal_sep: ',',
    },
    CurrencyInfo {
        code: "USD",
        locale: "en-US",
        label: "US Dollar ($)",
        symbol: "$",
        decimals: 2,
        thousands: ',',
        decimal_sep: '.',
    },
    CurrencyInfo {
        code: "EUR",
        locale: "es-ES",
        label: "Euro (€)",
        symbol: "€",
        decimals: 2,
        thousands: '.',
        decimal_sep: ',',
    },
    CurrencyInfo {
        code: "MXN",
        locale: "es-MX",
        label: "Mexican Peso ($)",
        symbol: "$",
        decimals: 2,
        thousands: ',',
        decimal_sep: '.',
    },
];

/// Looks up display configuration for a currency code, falling back to the default
/// entry for unknown codes.
pub fn currency_info(code: &str) -> &'static CurrencyInfo {
    AVAILABLE_CURRENCIES
        .iter()
        .find(|c| c.code == code)
        .unwrap_or(&AVAILABLE_CURRENCIES[0])
}

pub fn is_supported_currency(code: &str) -> bool {
    AVAILABLE_CURRENCIES.iter().any(|c| c.code == code)
}

/// Formats an amount using the display currency's locale conventions. The value must
/// already be in `display_currency`; this function never converts.
pub fn format_amount(amount: Decimal, display_currency: &str) -> String {
    use rust_decimal::prelude::ToPrimitive;

    let info = currency_info(display_currency);
    let (sign, magnitude) = if amount.is_sign_negative() {
        ("-", -amount)
    } else {
        ("", amount)
    };
    let value = magnitude.to_f64().unwrap_or_default();

    // format_num groups with ',' and uses '.' for decimals; remap to the locale's
    // separators afterwards.
    let grouped = if info.decimals == 0 {
        format_num::format_num!(",.0", value)
    } else {
        format_num::format_num!(",.2", value)
    };
    let localized: String = grouped
        .chars()
        .map(|c| match c {
            ',' => info.thousands,
            '.' => info.decimal_sep,
            other => other,
        })
        .collect();

    format!("{sign}{}{localized}", info.symbol)
}
