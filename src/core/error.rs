use rust_decimal::Decimal;
use thiserror::Error;

use super::tax::TaxCategoryCode;
use super::types::CurrencyCode;

/// Terminal errors raised while building lines, allowances/charges, or the
/// invoice itself.
///
/// Every variant identifies the offending field, line, allowance/charge, or
/// tax category. There is nothing transient here — the caller corrects the
/// inputs and builds again from scratch; no partial invoice is ever returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// A required field was not set before `build()`.
    #[error("{builder}: missing required field `{field}`")]
    MissingField {
        builder: &'static str,
        field: &'static str,
    },

    /// A line was built with a base quantity of zero.
    #[error("line `{id}`: base quantity must not be zero")]
    ZeroBaseQuantity { id: String },

    /// A line's currency does not match the document currency.
    #[error("line {index}: currency {found} does not match document currency {expected}")]
    CurrencyMismatch {
        index: usize,
        expected: CurrencyCode,
        found: CurrencyCode,
    },

    /// A document allowance/charge's currency does not match the document
    /// currency.
    #[error(
        "document allowance/charge {index}: currency {found} does not match document currency {expected}"
    )]
    AllowanceChargeCurrencyMismatch {
        index: usize,
        expected: CurrencyCode,
        found: CurrencyCode,
    },

    /// A line carried a malformed tax category.
    #[error("line {index}: {source}")]
    Line {
        index: usize,
        source: Box<BuildError>,
    },

    /// A document allowance/charge carried a malformed tax category.
    #[error("document allowance/charge {index}: {source}")]
    AllowanceCharge {
        index: usize,
        source: Box<BuildError>,
    },

    /// A rate-exempted category (Z, E, AE, K, G, O) carried a non-zero rate.
    #[error("tax category {code} is rate-exempted and must carry a 0% rate, got {percent}%")]
    ExemptedRateNotZero {
        code: TaxCategoryCode,
        percent: Decimal,
    },

    /// The standard-rate category carried a rate of zero.
    #[error("tax category {code} must carry a non-zero rate")]
    StandardRateZero { code: TaxCategoryCode },

    /// A category requiring an exemption reason had none registered.
    #[error("tax category {code} ({percent}%) requires an exemption reason")]
    MissingExemptionReason {
        code: TaxCategoryCode,
        percent: Decimal,
    },

    /// A tax-accounting currency was declared without an exchange rate.
    #[error(
        "tax currency {tax_currency} differs from document currency {currency} but no exchange rate was set"
    )]
    MissingExchangeRate {
        currency: CurrencyCode,
        tax_currency: CurrencyCode,
    },
}

/// A single advisory validation finding with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "lines[2].unit").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// EN 16931 business rule ID if applicable (e.g. "BR-CO-15").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with an EN 16931 rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}
