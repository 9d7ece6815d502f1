use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::BuildError;
use super::tax::{round2, TaxAggregator, TaxCategory, TaxCategoryCode, TaxSubtotal, TaxTotal};
use super::types::*;

/// Builder for a single invoice line.
///
/// ```
/// use efactura::core::*;
/// use rust_decimal_macros::dec;
///
/// let line = InvoiceLineBuilder::new("1")
///     .currency("RON")
///     .item_name("Abonament lunar")
///     .quantity(dec!(5))
///     .unit("C62")
///     .gross_price(dec!(12))
///     .tax(TaxCategory::standard(dec!(19)))
///     .build()
///     .unwrap();
///
/// assert_eq!(line.line_extension_amount, dec!(60.00));
/// ```
pub struct InvoiceLineBuilder {
    id: String,
    currency: Option<CurrencyCode>,
    quantity: Option<Decimal>,
    unit: Option<String>,
    gross_price: Option<Decimal>,
    base_quantity: Option<Decimal>,
    price_deduction: Decimal,
    item_name: Option<String>,
    description: Option<String>,
    allowances: Vec<LineAllowanceCharge>,
    charges: Vec<LineAllowanceCharge>,
    tax_category: Option<TaxCategory>,
}

impl InvoiceLineBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            currency: None,
            quantity: None,
            unit: None,
            gross_price: None,
            base_quantity: None,
            price_deduction: Decimal::ZERO,
            item_name: None,
            description: None,
            allowances: Vec::new(),
            charges: Vec::new(),
            tax_category: None,
        }
    }

    pub fn currency(mut self, code: impl Into<CurrencyCode>) -> Self {
        self.currency = Some(code.into());
        self
    }

    /// BT-129: Invoiced quantity. Negative quantities are legal and mark
    /// credit/correction lines.
    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// BT-130: Unit of measure (UN/CEFACT Rec 20).
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// BT-148: Item gross price.
    pub fn gross_price(mut self, price: Decimal) -> Self {
        self.gross_price = Some(price);
        self
    }

    /// BT-149: The price applies per this many units. Defaults to 1.
    pub fn base_quantity(mut self, quantity: Decimal) -> Self {
        self.base_quantity = Some(quantity);
        self
    }

    /// BT-147: Deduction subtracted from the gross price to obtain the net
    /// price. Recorded on the built line as an embedded [`PriceAllowance`].
    pub fn price_deduction(mut self, deduction: Decimal) -> Self {
        self.price_deduction = deduction;
        self
    }

    /// BT-153: Item name.
    pub fn item_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = Some(name.into());
        self
    }

    /// BT-154: Item description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tax(mut self, category: TaxCategory) -> Self {
        self.tax_category = Some(category);
        self
    }

    pub fn add_allowance(mut self, allowance: LineAllowanceCharge) -> Self {
        self.allowances.push(LineAllowanceCharge {
            is_charge: false,
            ..allowance
        });
        self
    }

    pub fn add_charge(mut self, charge: LineAllowanceCharge) -> Self {
        self.charges.push(LineAllowanceCharge {
            is_charge: true,
            ..charge
        });
        self
    }

    /// Finalize the line, deriving the net price and BT-131 net amount.
    pub fn build(self) -> Result<InvoiceLine, BuildError> {
        const BUILDER: &str = "invoice line";

        let missing = |field: &'static str| BuildError::MissingField {
            builder: BUILDER,
            field,
        };

        if self.id.trim().is_empty() {
            return Err(missing("id"));
        }
        let currency = self.currency.filter(|c| !c.is_empty()).ok_or(missing("currency"))?;
        let quantity = self.quantity.ok_or(missing("quantity"))?;
        let unit = self
            .unit
            .filter(|u| !u.trim().is_empty())
            .ok_or(missing("unit"))?;
        let gross_price = self.gross_price.ok_or(missing("gross price"))?;
        let item_name = self
            .item_name
            .filter(|n| !n.trim().is_empty())
            .ok_or(missing("item name"))?;
        let tax_category = self.tax_category.ok_or(missing("tax category"))?;
        if tax_category.scheme.is_empty() {
            return Err(missing("tax scheme"));
        }

        // Division by the base quantity happens below; zero must never get there.
        let base_quantity = self.base_quantity.unwrap_or(Decimal::ONE);
        if base_quantity.is_zero() {
            return Err(BuildError::ZeroBaseQuantity { id: self.id });
        }

        let (net_price, price_allowance) = if self.price_deduction.is_zero() {
            (gross_price, None)
        } else {
            (
                gross_price - self.price_deduction,
                Some(PriceAllowance {
                    amount: self.price_deduction,
                    base_amount: gross_price,
                }),
            )
        };

        let allowance_sum: Decimal = self.allowances.iter().map(|a| a.amount).sum();
        let charge_sum: Decimal = self.charges.iter().map(|c| c.amount).sum();

        // Single terminal rounding, half away from zero.
        let line_extension_amount =
            round2(quantity * net_price / base_quantity + charge_sum - allowance_sum);

        Ok(InvoiceLine {
            id: self.id,
            currency,
            quantity,
            unit,
            base_quantity,
            gross_price,
            net_price,
            price_allowance,
            allowances: self.allowances,
            charges: self.charges,
            tax_category,
            item_name,
            description: self.description,
            line_extension_amount,
        })
    }
}

/// Builder for a document-level allowance or charge.
///
/// Validates presence and shape only; all arithmetic happens in
/// [`InvoiceBuilder::build`].
pub struct AllowanceChargeBuilder {
    is_charge: bool,
    amount: Option<Decimal>,
    currency: Option<CurrencyCode>,
    base_amount: Option<Decimal>,
    reason: Option<String>,
    reason_code: Option<String>,
    tax_category: Option<TaxCategory>,
}

impl AllowanceChargeBuilder {
    /// Start an allowance (reduces the taxable base and the total).
    pub fn allowance() -> Self {
        Self::with_indicator(false)
    }

    /// Start a charge (increases the taxable base and the total).
    pub fn charge() -> Self {
        Self::with_indicator(true)
    }

    fn with_indicator(is_charge: bool) -> Self {
        Self {
            is_charge,
            amount: None,
            currency: None,
            base_amount: None,
            reason: None,
            reason_code: None,
            tax_category: None,
        }
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn currency(mut self, code: impl Into<CurrencyCode>) -> Self {
        self.currency = Some(code.into());
        self
    }

    pub fn base_amount(mut self, amount: Decimal) -> Self {
        self.base_amount = Some(amount);
        self
    }

    /// BT-97 / BT-104: Reason text.
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// BT-98 / BT-105: UNTDID 5189 (allowance) / 7161 (charge) reason code.
    pub fn reason_code(mut self, code: impl Into<String>) -> Self {
        self.reason_code = Some(code.into());
        self
    }

    pub fn tax(mut self, category: TaxCategory) -> Self {
        self.tax_category = Some(category);
        self
    }

    pub fn build(self) -> Result<DocumentAllowanceCharge, BuildError> {
        const BUILDER: &str = "document allowance/charge";

        let missing = |field: &'static str| BuildError::MissingField {
            builder: BUILDER,
            field,
        };

        let amount = self.amount.ok_or(missing("amount"))?;
        let currency = self.currency.filter(|c| !c.is_empty()).ok_or(missing("currency"))?;
        let tax_category = self.tax_category.ok_or(missing("tax category"))?;
        if tax_category.scheme.is_empty() {
            return Err(missing("tax scheme"));
        }

        Ok(DocumentAllowanceCharge {
            is_charge: self.is_charge,
            amount,
            currency,
            base_amount: self.base_amount,
            reason: self.reason,
            reason_code: self.reason_code,
            tax_category,
        })
    }
}

/// Builder for Party (supplier/customer).
pub struct PartyBuilder {
    name: String,
    vat_id: Option<String>,
    registration_id: Option<String>,
    address: Address,
    contact: Option<Contact>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            vat_id: None,
            registration_id: None,
            address,
            contact: None,
        }
    }

    pub fn vat_id(mut self, id: impl Into<String>) -> Self {
        self.vat_id = Some(id.into());
        self
    }

    pub fn registration_id(mut self, id: impl Into<String>) -> Self {
        self.registration_id = Some(id.into());
        self
    }

    pub fn contact(
        mut self,
        name: Option<String>,
        phone: Option<String>,
        email: Option<String>,
    ) -> Self {
        self.contact = Some(Contact { name, phone, email });
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            vat_id: self.vat_id,
            registration_id: self.registration_id,
            address: self.address,
            contact: self.contact,
        }
    }
}

/// Builder for Address.
pub struct AddressBuilder {
    street: Option<String>,
    city: String,
    county: Option<String>,
    postal_code: Option<String>,
    country_code: String,
}

impl AddressBuilder {
    pub fn new(city: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            street: None,
            city: city.into(),
            county: None,
            postal_code: None,
            country_code: country_code.into(),
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    /// Județ, or sector for București.
    pub fn county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    pub fn postal_code(mut self, code: impl Into<String>) -> Self {
        self.postal_code = Some(code.into());
        self
    }

    pub fn build(self) -> Address {
        Address {
            street: self.street,
            city: self.city,
            county: self.county,
            postal_code: self.postal_code,
            country_code: self.country_code,
        }
    }
}

#[derive(Default)]
struct ExemptionReasonEntry {
    reason: Option<String>,
    code: Option<String>,
}

/// Builder for constructing invoices with fully derived totals.
///
/// The builder is mutated by the fluent setters and consumed by
/// [`build`](Self::build); a failed build returns an error and nothing else —
/// there is no partially constructed invoice to observe.
///
/// ```
/// use chrono::NaiveDate;
/// use efactura::core::*;
/// use rust_decimal_macros::dec;
///
/// let invoice = InvoiceBuilder::new("EF-2024-0042", NaiveDate::from_ymd_opt(2024, 5, 20).unwrap())
///     .due_date(NaiveDate::from_ymd_opt(2024, 6, 19).unwrap())
///     .add_line(
///         InvoiceLineBuilder::new("1")
///             .currency("RON")
///             .item_name("Mentenanță")
///             .quantity(dec!(1))
///             .unit("C62")
///             .gross_price(dec!(400))
///             .tax(TaxCategory::standard(dec!(19)))
///             .build()
///             .unwrap(),
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.totals.payable_amount, dec!(476.00));
/// ```
pub struct InvoiceBuilder {
    number: String,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    type_code: InvoiceTypeCode,
    currency: CurrencyCode,
    tax_currency: Option<CurrencyCode>,
    exchange_rate: Option<Decimal>,
    notes: Vec<String>,
    supplier: Option<Party>,
    customer: Option<Party>,
    payment_terms: Option<String>,
    lines: Vec<InvoiceLine>,
    allowance_charges: Vec<DocumentAllowanceCharge>,
    exemption_reasons: HashMap<TaxCategoryCode, ExemptionReasonEntry>,
    prepaid: Decimal,
    expected_tax_inclusive_amount: Option<Decimal>,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            issue_date,
            due_date: None,
            type_code: InvoiceTypeCode::Invoice,
            currency: CurrencyCode::from("RON"),
            tax_currency: None,
            exchange_rate: None,
            notes: Vec::new(),
            supplier: None,
            customer: None,
            payment_terms: None,
            lines: Vec::new(),
            allowance_charges: Vec::new(),
            exemption_reasons: HashMap::new(),
            prepaid: Decimal::ZERO,
            expected_tax_inclusive_amount: None,
        }
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn type_code(mut self, code: InvoiceTypeCode) -> Self {
        self.type_code = code;
        self
    }

    /// BT-5: Document currency. Defaults to RON.
    pub fn currency(mut self, code: impl Into<CurrencyCode>) -> Self {
        self.currency = code.into();
        self
    }

    /// BT-6: VAT accounting currency. Requires an
    /// [`exchange_rate`](Self::exchange_rate) when it differs from the
    /// document currency.
    pub fn tax_currency(mut self, code: impl Into<CurrencyCode>) -> Self {
        self.tax_currency = Some(code.into());
        self
    }

    /// Document-currency → tax-currency conversion rate.
    pub fn exchange_rate(mut self, rate: Decimal) -> Self {
        self.exchange_rate = Some(rate);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn supplier(mut self, party: Party) -> Self {
        self.supplier = Some(party);
        self
    }

    pub fn customer(mut self, party: Party) -> Self {
        self.customer = Some(party);
        self
    }

    pub fn payment_terms(mut self, terms: impl Into<String>) -> Self {
        self.payment_terms = Some(terms.into());
        self
    }

    pub fn add_line(mut self, line: InvoiceLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn add_allowance_charge(mut self, allowance_charge: DocumentAllowanceCharge) -> Self {
        self.allowance_charges.push(allowance_charge);
        self
    }

    /// BT-120: Register the exemption reason text for a tax category code.
    ///
    /// Required before `build()` for every reason-requiring category
    /// (E, AE, K, G, O) present on the invoice.
    pub fn exemption_reason(
        mut self,
        code: TaxCategoryCode,
        reason: impl Into<String>,
    ) -> Self {
        self.exemption_reasons.entry(code).or_default().reason = Some(reason.into());
        self
    }

    /// BT-121: Register the VATEX exemption reason code for a tax category
    /// code. Satisfies the reason requirement on its own.
    pub fn exemption_reason_code(
        mut self,
        code: TaxCategoryCode,
        reason_code: impl Into<String>,
    ) -> Self {
        self.exemption_reasons.entry(code).or_default().code = Some(reason_code.into());
        self
    }

    /// BT-113: Prepaid amount, subtracted from the payable amount.
    pub fn prepaid(mut self, amount: Decimal) -> Self {
        self.prepaid = amount;
        self
    }

    /// Externally expected BT-112 value. When it differs from the computed
    /// tax-inclusive amount, the difference becomes the BT-114 rounding
    /// amount and the payable amount absorbs it.
    pub fn expected_tax_inclusive_amount(mut self, amount: Decimal) -> Self {
        self.expected_tax_inclusive_amount = Some(amount);
        self
    }

    /// Build the invoice, aggregating tax buckets and deriving all totals.
    ///
    /// Fails on the first violation: missing required fields, a line or
    /// document allowance/charge in a foreign currency, a malformed tax
    /// category, or a reason-requiring category without a registered
    /// exemption reason.
    pub fn build(self) -> Result<Invoice, BuildError> {
        const BUILDER: &str = "invoice";

        if self.number.trim().is_empty() {
            return Err(BuildError::MissingField {
                builder: BUILDER,
                field: "number",
            });
        }
        // Issue date presence is guaranteed by the constructor.
        if self.currency.is_empty() {
            return Err(BuildError::MissingField {
                builder: BUILDER,
                field: "currency",
            });
        }

        // Declaring the document currency again as tax currency is a no-op.
        let tax_currency = self.tax_currency.filter(|c| *c != self.currency);
        let exchange_rate = match (&tax_currency, self.exchange_rate) {
            (Some(_), Some(rate)) => Some(rate),
            (Some(tc), None) => {
                return Err(BuildError::MissingExchangeRate {
                    currency: self.currency.clone(),
                    tax_currency: tc.clone(),
                });
            }
            (None, _) => None,
        };

        let mut aggregator = TaxAggregator::new();

        let mut line_extension_total = Decimal::ZERO;
        for (index, line) in self.lines.iter().enumerate() {
            if line.currency != self.currency {
                return Err(BuildError::CurrencyMismatch {
                    index,
                    expected: self.currency.clone(),
                    found: line.currency.clone(),
                });
            }
            // Sign preserved: credit lines subtract from their bucket's base.
            aggregator
                .add(&line.tax_category, line.line_extension_amount)
                .map_err(|source| BuildError::Line {
                    index,
                    source: Box::new(source),
                })?;
            line_extension_total += line.line_extension_amount;
        }

        let mut allowance_total = Decimal::ZERO;
        let mut charge_total = Decimal::ZERO;
        for (index, ac) in self.allowance_charges.iter().enumerate() {
            if ac.currency != self.currency {
                return Err(BuildError::AllowanceChargeCurrencyMismatch {
                    index,
                    expected: self.currency.clone(),
                    found: ac.currency.clone(),
                });
            }
            let signed_base = if ac.is_charge {
                charge_total += ac.amount;
                ac.amount
            } else {
                allowance_total += ac.amount;
                -ac.amount
            };
            aggregator
                .add(&ac.tax_category, signed_base)
                .map_err(|source| BuildError::AllowanceCharge {
                    index,
                    source: Box::new(source),
                })?;
        }

        // Buckets combine by addition, so the totals below are independent of
        // line and allowance/charge order; summaries() sorts for stable output.
        let mut subtotals = Vec::new();
        let mut tax_total_amount = Decimal::ZERO;
        for summary in aggregator.summaries() {
            let tax_amount = summary.tax_amount();
            let category = summary.category;

            // Blank registrations do not satisfy the reason requirement.
            let (reason, reason_code) = match self.exemption_reasons.get(&category.code) {
                Some(entry) => (
                    entry.reason.clone().filter(|r| !r.trim().is_empty()),
                    entry.code.clone().filter(|c| !c.trim().is_empty()),
                ),
                None => (None, None),
            };
            if category.code.requires_exemption_reason()
                && reason.is_none()
                && reason_code.is_none()
            {
                return Err(BuildError::MissingExemptionReason {
                    code: category.code,
                    percent: category.percent,
                });
            }

            tax_total_amount += tax_amount;
            subtotals.push(TaxSubtotal {
                taxable_amount: summary.base_amount,
                tax_amount,
                category,
                exemption_reason: reason,
                exemption_reason_code: reason_code,
            });
        }

        let tax_exclusive_amount = line_extension_total + charge_total - allowance_total;
        let tax_inclusive_amount = tax_exclusive_amount + tax_total_amount;

        let payable_rounding_amount = self
            .expected_tax_inclusive_amount
            .map(|expected| expected - tax_inclusive_amount)
            .filter(|difference| !difference.is_zero());

        let payable_amount = tax_inclusive_amount - self.prepaid
            + payable_rounding_amount.unwrap_or(Decimal::ZERO);

        let mut tax_totals = vec![TaxTotal {
            currency: self.currency.clone(),
            tax_amount: tax_total_amount,
            subtotals,
        }];
        if let (Some(tc), Some(rate)) = (tax_currency.clone(), exchange_rate) {
            // Informational only: the converted total never feeds BT-112/BT-115.
            let converted: Decimal = tax_totals[0]
                .subtotals
                .iter()
                .map(|subtotal| round2(subtotal.tax_amount * rate))
                .sum();
            tax_totals.push(TaxTotal {
                currency: tc,
                tax_amount: converted,
                subtotals: Vec::new(),
            });
        }

        let (allowances, charges): (Vec<_>, Vec<_>) = self
            .allowance_charges
            .into_iter()
            .partition(|ac| !ac.is_charge);

        Ok(Invoice {
            number: self.number,
            issue_date: self.issue_date,
            due_date: self.due_date,
            type_code: self.type_code,
            currency: self.currency,
            tax_currency,
            notes: self.notes,
            supplier: self.supplier,
            customer: self.customer,
            payment_terms: self.payment_terms,
            lines: self.lines,
            allowances,
            charges,
            totals: DocumentTotals {
                line_extension_amount: line_extension_total,
                allowance_total_amount: allowance_total,
                charge_total_amount: charge_total,
                tax_exclusive_amount,
                tax_inclusive_amount,
                prepaid_amount: self.prepaid,
                payable_rounding_amount,
                payable_amount,
            },
            tax_totals,
        })
    }
}
