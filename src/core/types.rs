use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::tax::{TaxCategory, TaxTotal};

/// BT-5 / BT-6: ISO 4217 currency code.
///
/// Amounts in different currencies are never combined; the invoice builder
/// rejects lines and document-level allowances/charges whose currency does
/// not match the document currency. The tax-accounting currency (BT-6) is the
/// one sanctioned exception and is converted explicitly via the exchange rate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Check against the ISO 4217 lookup table.
    pub fn is_known(&self) -> bool {
        super::currencies::is_known_currency_code(&self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        Self(code.to_owned())
    }
}

impl From<String> for CurrencyCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// UNTDID 1001 — Invoice type codes (subset accepted by CIUS-RO).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceTypeCode {
    /// 380 — Commercial invoice.
    Invoice,
    /// 381 — Credit note.
    CreditNote,
    /// 384 — Corrected invoice.
    Corrected,
    /// 389 — Self-billed invoice.
    SelfBilled,
}

impl InvoiceTypeCode {
    /// UNTDID 1001 numeric code.
    pub fn code(&self) -> u16 {
        match self {
            Self::Invoice => 380,
            Self::CreditNote => 381,
            Self::Corrected => 384,
            Self::SelfBilled => 389,
        }
    }

    /// Parse from UNTDID 1001 numeric code.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            380 => Some(Self::Invoice),
            381 => Some(Self::CreditNote),
            384 => Some(Self::Corrected),
            389 => Some(Self::SelfBilled),
            _ => None,
        }
    }
}

/// BG-4 / BG-7: Party (supplier or customer).
///
/// Pass-through for the totals engine: parties are carried on the built
/// invoice for the serializer but never read during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// BT-27 / BT-44: Name.
    pub name: String,
    /// BT-31 / BT-48: VAT identifier (e.g. "RO12345678").
    pub vat_id: Option<String>,
    /// BT-30 / BT-47: Legal registration identifier (nr. Reg. Com.).
    pub registration_id: Option<String>,
    /// BG-5 / BG-8: Postal address.
    pub address: Address,
    /// BG-6 / BG-9: Contact information.
    pub contact: Option<Contact>,
}

/// BG-5 / BG-8: Postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// BT-35 / BT-50: Street + number.
    pub street: Option<String>,
    /// BT-37 / BT-52: City.
    pub city: String,
    /// BT-39 / BT-54: Country subdivision (județ, or sector for București).
    pub county: Option<String>,
    /// BT-38 / BT-53: Postal code.
    pub postal_code: Option<String>,
    /// BT-40 / BT-55: Country code (ISO 3166-1 alpha-2).
    pub country_code: String,
}

/// BG-6 / BG-9: Contact information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// BT-41 / BT-56: Contact point name.
    pub name: Option<String>,
    /// BT-42 / BT-57: Telephone.
    pub phone: Option<String>,
    /// BT-43 / BT-58: Email.
    pub email: Option<String>,
}

/// Price deduction embedded in a line's price (BT-147/BT-148).
///
/// Recorded when a line is built with a price deduction: the deduction
/// lowers the net price directly and this record preserves the original
/// gross price for the serializer. It is not part of the line's
/// allowance/charge list and is never subtracted a second time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceAllowance {
    /// BT-147: Deducted amount per unit.
    pub amount: Decimal,
    /// BT-148: Gross price the deduction applies to.
    pub base_amount: Decimal,
}

/// BG-27 / BG-28: Line-level allowance or charge.
///
/// Carries no tax category of its own — the owning line's category applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAllowanceCharge {
    /// True = charge, false = allowance.
    pub is_charge: bool,
    /// BT-136 / BT-141: Amount.
    pub amount: Decimal,
    /// BT-137 / BT-142: Base amount.
    pub base_amount: Option<Decimal>,
    /// BT-139 / BT-144: Reason text.
    pub reason: Option<String>,
    /// BT-140 / BT-145: Reason code (UNTDID 5189 / 7161).
    pub reason_code: Option<String>,
}

/// BG-20 / BG-21: Document-level allowance or charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAllowanceCharge {
    /// True = charge, false = allowance.
    pub is_charge: bool,
    /// BT-92 / BT-99: Amount.
    pub amount: Decimal,
    /// Currency of the amount; must match the document currency.
    pub currency: CurrencyCode,
    /// BT-93 / BT-100: Base amount.
    pub base_amount: Option<Decimal>,
    /// BT-97 / BT-104: Reason text.
    pub reason: Option<String>,
    /// BT-98 / BT-105: Reason code (UNTDID 5189 / 7161).
    pub reason_code: Option<String>,
    /// BT-95/BT-96 / BT-102/BT-103: Tax category the amount belongs to.
    pub tax_category: TaxCategory,
}

/// BG-25: Invoice line, finalized by [`InvoiceLineBuilder`].
///
/// [`InvoiceLineBuilder`]: super::InvoiceLineBuilder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// BT-126: Line identifier.
    pub id: String,
    /// Currency of all amounts on this line.
    pub currency: CurrencyCode,
    /// BT-129: Invoiced quantity. Negative for credit/correction lines.
    pub quantity: Decimal,
    /// BT-130: Unit of measure (UN/CEFACT Rec 20, e.g. "C62", "HUR").
    pub unit: String,
    /// BT-149: Item price base quantity — the price applies per this many
    /// units. Never zero.
    pub base_quantity: Decimal,
    /// BT-148: Item gross price.
    pub gross_price: Decimal,
    /// BT-146: Item net price = gross price − price deduction.
    pub net_price: Decimal,
    /// Embedded record of the price deduction, when one was applied.
    pub price_allowance: Option<PriceAllowance>,
    /// BG-27: Line allowances.
    pub allowances: Vec<LineAllowanceCharge>,
    /// BG-28: Line charges.
    pub charges: Vec<LineAllowanceCharge>,
    /// BT-151 / BT-152: Tax category for this line.
    pub tax_category: TaxCategory,
    /// BT-153: Item name.
    pub item_name: String,
    /// BT-154: Item description.
    pub description: Option<String>,
    /// BT-131: Line net amount =
    /// round2(quantity × net price ÷ base quantity + charges − allowances).
    pub line_extension_amount: Decimal,
}

/// BG-22: Document totals (BT-106…BT-115), all in the document currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// BT-106: Sum of all line net amounts.
    pub line_extension_amount: Decimal,
    /// BT-107: Sum of document-level allowance amounts.
    pub allowance_total_amount: Decimal,
    /// BT-108: Sum of document-level charge amounts.
    pub charge_total_amount: Decimal,
    /// BT-109: Total without VAT = BT-106 − BT-107 + BT-108.
    pub tax_exclusive_amount: Decimal,
    /// BT-112: Total with VAT = BT-109 + BT-110.
    pub tax_inclusive_amount: Decimal,
    /// BT-113: Prepaid amount.
    pub prepaid_amount: Decimal,
    /// BT-114: Rounding correction toward an externally expected
    /// tax-inclusive amount. Absent when no correction applies.
    pub payable_rounding_amount: Option<Decimal>,
    /// BT-115: Amount due = BT-112 − BT-113 + BT-114.
    pub payable_amount: Decimal,
}

/// BG-0: Invoice — the finalized document.
///
/// Immutable once built: every derived amount satisfies the EN 16931
/// accounting identities, checked again by
/// [`validate_arithmetic`](super::validate_arithmetic).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// BT-1: Invoice number.
    pub number: String,
    /// BT-2: Issue date.
    pub issue_date: NaiveDate,
    /// BT-9: Payment due date.
    pub due_date: Option<NaiveDate>,
    /// BT-3: Invoice type code (UNTDID 1001).
    pub type_code: InvoiceTypeCode,
    /// BT-5: Invoice currency code.
    pub currency: CurrencyCode,
    /// BT-6: VAT accounting currency, when it differs from BT-5.
    pub tax_currency: Option<CurrencyCode>,
    /// BT-22: Notes / free text.
    pub notes: Vec<String>,
    /// BG-4: Supplier (AccountingSupplierParty).
    pub supplier: Option<Party>,
    /// BG-7: Customer (AccountingCustomerParty).
    pub customer: Option<Party>,
    /// BT-20: Payment terms free text.
    pub payment_terms: Option<String>,
    /// BG-25: Invoice lines.
    pub lines: Vec<InvoiceLine>,
    /// BG-20: Document-level allowances.
    pub allowances: Vec<DocumentAllowanceCharge>,
    /// BG-21: Document-level charges.
    pub charges: Vec<DocumentAllowanceCharge>,
    /// BG-22: Document totals.
    pub totals: DocumentTotals,
    /// One tax total in the document currency (with per-category subtotals),
    /// optionally a second in the tax-accounting currency (aggregate only).
    pub tax_totals: Vec<TaxTotal>,
}

impl Invoice {
    /// The document-currency tax total (always the first entry).
    pub fn tax_total(&self) -> Option<&TaxTotal> {
        self.tax_totals.first()
    }

    /// The tax-accounting-currency total, when the invoice declares one.
    pub fn tax_total_in_tax_currency(&self) -> Option<&TaxTotal> {
        self.tax_totals.get(1)
    }
}
