use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::BuildError;
use super::types::CurrencyCode;

/// Round to 2 decimal places, half away from zero (commercial rounding).
pub(crate) fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// BT-151-2: Tax scheme identifier.
///
/// Only the VAT scheme participates in the rate-shape rules enforced by
/// [`TaxAggregator`]; other schemes pass through unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxSchemeId(String);

impl TaxSchemeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The VAT scheme ("VAT"), the default for every category.
    pub fn vat() -> Self {
        Self("VAT".to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn is_vat(&self) -> bool {
        self.0 == "VAT"
    }
}

impl Default for TaxSchemeId {
    fn default() -> Self {
        Self::vat()
    }
}

impl From<&str> for TaxSchemeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for TaxSchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// UNTDID 5305 — Tax category codes.
///
/// The codes split into two disjoint families: [`StandardRate`] must carry a
/// non-zero percent, every other code is rate-exempted and must carry a
/// percent of exactly zero. The aggregator rejects categories violating this.
///
/// [`StandardRate`]: TaxCategoryCode::StandardRate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxCategoryCode {
    /// S — Standard rate.
    StandardRate,
    /// Z — Zero rated goods.
    ZeroRated,
    /// E — Exempt from tax.
    Exempt,
    /// AE — Reverse charge (taxare inversă).
    ReverseCharge,
    /// K — Intra-community supply, exempt.
    IntraCommunitySupply,
    /// G — Free export item, tax not charged.
    Export,
    /// O — Services outside scope of tax.
    NotSubjectToVat,
}

impl TaxCategoryCode {
    /// UNTDID 5305 code letter.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StandardRate => "S",
            Self::ZeroRated => "Z",
            Self::Exempt => "E",
            Self::ReverseCharge => "AE",
            Self::IntraCommunitySupply => "K",
            Self::Export => "G",
            Self::NotSubjectToVat => "O",
        }
    }

    /// Parse from UNTDID 5305 code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(Self::StandardRate),
            "Z" => Some(Self::ZeroRated),
            "E" => Some(Self::Exempt),
            "AE" => Some(Self::ReverseCharge),
            "K" => Some(Self::IntraCommunitySupply),
            "G" => Some(Self::Export),
            "O" => Some(Self::NotSubjectToVat),
            _ => None,
        }
    }

    /// True for every code whose VAT percent must be exactly zero.
    pub fn is_rate_exempted(&self) -> bool {
        !matches!(self, Self::StandardRate)
    }

    /// True for codes whose tax subtotal must carry an exemption reason
    /// (BR-E-10 family). Zero-rated goods need none.
    pub fn requires_exemption_reason(&self) -> bool {
        matches!(
            self,
            Self::Exempt
                | Self::ReverseCharge
                | Self::IntraCommunitySupply
                | Self::Export
                | Self::NotSubjectToVat
        )
    }
}

impl fmt::Display for TaxCategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// BT-151/BT-152: Tax category — code, percent, and scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCategory {
    pub code: TaxCategoryCode,
    /// BT-152 / BT-119: Rate percentage (e.g. 19 for 19%).
    pub percent: Decimal,
    pub scheme: TaxSchemeId,
}

impl TaxCategory {
    /// Category under the VAT scheme.
    pub fn new(code: TaxCategoryCode, percent: Decimal) -> Self {
        Self {
            code,
            percent,
            scheme: TaxSchemeId::vat(),
        }
    }

    /// Standard-rate VAT category with the given percent.
    pub fn standard(percent: Decimal) -> Self {
        Self::new(TaxCategoryCode::StandardRate, percent)
    }

    pub fn with_scheme(mut self, scheme: impl Into<TaxSchemeId>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Bucketing identity: `(code, percent, scheme)`.
    pub fn key(&self) -> TaxCategoryKey {
        TaxCategoryKey {
            code: self.code,
            percent: self.percent,
            scheme: self.scheme.clone(),
        }
    }

    /// Enforce the rate-shape rules for VAT categories: rate-exempted codes
    /// carry 0%, the standard code carries a non-zero percent. Non-VAT
    /// schemes are not checked.
    pub(crate) fn validate_rate(&self) -> Result<(), BuildError> {
        if !self.scheme.is_vat() {
            return Ok(());
        }
        if self.code.is_rate_exempted() {
            if !self.percent.is_zero() {
                return Err(BuildError::ExemptedRateNotZero {
                    code: self.code,
                    percent: self.percent,
                });
            }
        } else if self.percent.is_zero() {
            return Err(BuildError::StandardRateZero { code: self.code });
        }
        Ok(())
    }
}

/// Bucketing key for tax aggregation.
///
/// `Decimal` equality is numeric, so `(S, 19)` and `(S, 19.0)` share a
/// bucket while `(S, 19)` and `(S, 9)` stay distinct — mixed-rate invoices
/// produce one subtotal per rate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaxCategoryKey {
    pub code: TaxCategoryCode,
    pub percent: Decimal,
    pub scheme: TaxSchemeId,
}

/// Accumulated taxable base for one tax category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCategorySummary {
    pub category: TaxCategory,
    /// BT-116: Signed sum of all base amounts fed to this bucket.
    pub base_amount: Decimal,
}

impl TaxCategorySummary {
    /// BT-117: `round2(base_amount × percent ÷ 100)`.
    pub fn tax_amount(&self) -> Decimal {
        round2(self.base_amount * self.category.percent / dec!(100))
    }
}

/// BG-23: Tax subtotal for one category present on the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSubtotal {
    /// BT-116: Taxable amount.
    pub taxable_amount: Decimal,
    /// BT-117: Tax amount.
    pub tax_amount: Decimal,
    /// BT-118 / BT-119: Category and rate.
    pub category: TaxCategory,
    /// BT-120: Exemption reason text.
    pub exemption_reason: Option<String>,
    /// BT-121: Exemption reason code (VATEX).
    pub exemption_reason_code: Option<String>,
}

/// BT-110 / BT-111: Tax total in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTotal {
    pub currency: CurrencyCode,
    pub tax_amount: Decimal,
    /// Per-category breakdown. Populated for the document-currency total,
    /// empty for the tax-accounting-currency total.
    pub subtotals: Vec<TaxSubtotal>,
}

/// Accumulator bucketing taxable base amounts by [`TaxCategoryKey`].
///
/// Lines feed their signed `line_extension_amount` unchanged; document
/// charges feed `+amount`, document allowances feed `−amount`. Buckets
/// combine by addition, so ingest order never affects the result.
#[derive(Debug, Default)]
pub struct TaxAggregator {
    buckets: HashMap<TaxCategoryKey, TaxCategorySummary>,
}

impl TaxAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one signed base amount for `category`.
    ///
    /// Rejects malformed VAT categories (non-zero percent on a rate-exempted
    /// code, zero percent on the standard code); the error is terminal for
    /// the enclosing build.
    pub fn add(&mut self, category: &TaxCategory, base_amount: Decimal) -> Result<(), BuildError> {
        category.validate_rate()?;
        self.buckets
            .entry(category.key())
            .or_insert_with(|| TaxCategorySummary {
                category: category.clone(),
                base_amount: Decimal::ZERO,
            })
            .base_amount += base_amount;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// One summary per distinct key, sorted by `(code, percent)` for
    /// deterministic downstream output.
    pub fn summaries(&self) -> Vec<TaxCategorySummary> {
        let mut out: Vec<TaxCategorySummary> = self.buckets.values().cloned().collect();
        out.sort_by(|a, b| {
            a.category
                .code
                .code()
                .cmp(b.category.code.code())
                .then(a.category.percent.cmp(&b.category.percent))
        });
        out
    }
}
