use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ValidationError;
use super::tax::{round2, TaxCategoryCode};
use super::types::*;

/// Cross-check the accounting identities of a built invoice.
///
/// Re-derives every total from its parts and reports all mismatches (not just
/// the first). An invoice produced by [`InvoiceBuilder`] always passes; the
/// checks exist for invoices deserialized from external sources.
///
/// [`InvoiceBuilder`]: super::InvoiceBuilder
pub fn validate_arithmetic(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let totals = &invoice.totals;

    // BR-CO-10: Sum of line net amounts
    let expected_line_total: Decimal =
        invoice.lines.iter().map(|l| l.line_extension_amount).sum();
    if totals.line_extension_amount != expected_line_total {
        errors.push(ValidationError::with_rule(
            "totals.line_extension_amount",
            format!(
                "line total {} does not match sum of line net amounts {}",
                totals.line_extension_amount, expected_line_total
            ),
            "BR-CO-10",
        ));
    }

    // BR-CO-11 / BR-CO-12: Allowance and charge totals
    let expected_allowances: Decimal = invoice.allowances.iter().map(|a| a.amount).sum();
    if totals.allowance_total_amount != expected_allowances {
        errors.push(ValidationError::with_rule(
            "totals.allowance_total_amount",
            format!(
                "allowance total {} does not match sum of allowances {}",
                totals.allowance_total_amount, expected_allowances
            ),
            "BR-CO-11",
        ));
    }
    let expected_charges: Decimal = invoice.charges.iter().map(|c| c.amount).sum();
    if totals.charge_total_amount != expected_charges {
        errors.push(ValidationError::with_rule(
            "totals.charge_total_amount",
            format!(
                "charge total {} does not match sum of charges {}",
                totals.charge_total_amount, expected_charges
            ),
            "BR-CO-12",
        ));
    }

    // BR-CO-13: tax exclusive = lines − allowances + charges
    let expected_exclusive = totals.line_extension_amount - totals.allowance_total_amount
        + totals.charge_total_amount;
    if totals.tax_exclusive_amount != expected_exclusive {
        errors.push(ValidationError::with_rule(
            "totals.tax_exclusive_amount",
            format!(
                "tax exclusive amount {} does not match calculation {}",
                totals.tax_exclusive_amount, expected_exclusive
            ),
            "BR-CO-13",
        ));
    }

    // BR-CO-14: document tax total = sum of subtotal tax amounts
    // BR-CO-17: subtotal tax amount = round2(taxable × rate ÷ 100)
    let mut document_tax = Decimal::ZERO;
    if let Some(tax_total) = invoice.tax_total() {
        document_tax = tax_total.tax_amount;
        let breakdown_sum: Decimal = tax_total.subtotals.iter().map(|s| s.tax_amount).sum();
        if tax_total.tax_amount != breakdown_sum {
            errors.push(ValidationError::with_rule(
                "tax_totals[0].tax_amount",
                format!(
                    "tax total {} does not match sum of subtotal amounts {}",
                    tax_total.tax_amount, breakdown_sum
                ),
                "BR-CO-14",
            ));
        }
        for (i, subtotal) in tax_total.subtotals.iter().enumerate() {
            let expected = round2(subtotal.taxable_amount * subtotal.category.percent / dec!(100));
            if subtotal.tax_amount != expected {
                errors.push(ValidationError::with_rule(
                    format!("tax_totals[0].subtotals[{i}].tax_amount"),
                    format!(
                        "tax amount {} does not match taxable {} × rate {}% = {}",
                        subtotal.tax_amount,
                        subtotal.taxable_amount,
                        subtotal.category.percent,
                        expected
                    ),
                    "BR-CO-17",
                ));
            }
        }
    }

    // BR-CO-15: tax inclusive = tax exclusive + tax total
    let expected_inclusive = totals.tax_exclusive_amount + document_tax;
    if totals.tax_inclusive_amount != expected_inclusive {
        errors.push(ValidationError::with_rule(
            "totals.tax_inclusive_amount",
            format!(
                "tax inclusive amount {} does not match exclusive {} + tax {}",
                totals.tax_inclusive_amount, totals.tax_exclusive_amount, document_tax
            ),
            "BR-CO-15",
        ));
    }

    // BR-CO-16: payable = inclusive − prepaid + rounding
    let expected_payable = totals.tax_inclusive_amount - totals.prepaid_amount
        + totals.payable_rounding_amount.unwrap_or(Decimal::ZERO);
    if totals.payable_amount != expected_payable {
        errors.push(ValidationError::with_rule(
            "totals.payable_amount",
            format!(
                "payable amount {} does not match calculation {}",
                totals.payable_amount, expected_payable
            ),
            "BR-CO-16",
        ));
    }

    // BR-DEC-12/-14/-17/-18: headline amounts carry at most 2 decimals
    check_decimal_places(&totals.tax_exclusive_amount, "totals.tax_exclusive_amount", &mut errors);
    check_decimal_places(&totals.tax_inclusive_amount, "totals.tax_inclusive_amount", &mut errors);
    check_decimal_places(&document_tax, "tax_totals[0].tax_amount", &mut errors);
    check_decimal_places(&totals.payable_amount, "totals.payable_amount", &mut errors);

    errors
}

/// Validate a built invoice against the EN 16931 structural rules not already
/// enforced by the builders: line presence and uniqueness, code-list
/// membership, and tax-subtotal shape. Returns all findings.
pub fn validate_en16931(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // BR-16: An Invoice shall have at least one Invoice line
    if invoice.lines.is_empty() {
        errors.push(ValidationError::with_rule(
            "lines",
            "invoice must have at least one line",
            "BR-16",
        ));
    }

    // BR-CO-04: Each invoice line identifier (BT-126) must be unique
    {
        let mut seen = std::collections::HashSet::new();
        for (i, line) in invoice.lines.iter().enumerate() {
            if !seen.insert(&line.id) {
                errors.push(ValidationError::with_rule(
                    format!("lines[{i}].id"),
                    format!("duplicate line identifier '{}'", line.id),
                    "BR-CO-04",
                ));
            }
        }
    }

    // BR-05: Invoice currency must be a known ISO 4217 code
    check_currency(&invoice.currency, "currency", &mut errors);
    if let Some(tax_currency) = &invoice.tax_currency {
        check_currency(tax_currency, "tax_currency", &mut errors);
    }

    // BR-23: Each line shall have a unit of measure from UN/CEFACT Rec 20
    for (i, line) in invoice.lines.iter().enumerate() {
        if !super::units::is_known_unit_code(&line.unit) {
            errors.push(ValidationError::with_rule(
                format!("lines[{i}].unit"),
                format!("unit code '{}' is not a known UN/CEFACT Rec 20 code", line.unit),
                "BR-23",
            ));
        }
    }

    // BR-11 / BR-12: Party country codes must be known ISO 3166-1 alpha-2
    if let Some(supplier) = &invoice.supplier {
        check_country(&supplier.address.country_code, "supplier.address.country_code", "BR-11", &mut errors);
    }
    if let Some(customer) = &invoice.customer {
        check_country(&customer.address.country_code, "customer.address.country_code", "BR-12", &mut errors);
    }

    // UNTDID 5189/7161 reason codes on document-level allowances/charges
    for (i, ac) in invoice.allowances.iter().enumerate() {
        if let Some(code) = &ac.reason_code {
            if !super::reason_codes::is_known_allowance_reason(code) {
                errors.push(ValidationError::with_rule(
                    format!("allowances[{i}].reason_code"),
                    format!("allowance reason code '{code}' is not a known UNTDID 5189 code"),
                    "BR-CO-21",
                ));
            }
        }
    }
    for (i, ac) in invoice.charges.iter().enumerate() {
        if let Some(code) = &ac.reason_code {
            if !super::reason_codes::is_known_charge_reason(code) {
                errors.push(ValidationError::with_rule(
                    format!("charges[{i}].reason_code"),
                    format!("charge reason code '{code}' is not a known UNTDID 7161 code"),
                    "BR-CO-22",
                ));
            }
        }
    }

    // Category shape and exemption reasons on the VAT breakdown
    if let Some(tax_total) = invoice.tax_total() {
        for (i, subtotal) in tax_total.subtotals.iter().enumerate() {
            let code = subtotal.category.code;
            let rate = subtotal.category.percent;

            if code.is_rate_exempted() {
                if !rate.is_zero() {
                    errors.push(ValidationError::with_rule(
                        format!("tax_totals[0].subtotals[{i}].category"),
                        format!("category {code} must have rate 0, got {rate}%"),
                        rate_rule(code),
                    ));
                }
            } else if rate.is_zero() {
                errors.push(ValidationError::with_rule(
                    format!("tax_totals[0].subtotals[{i}].category"),
                    format!("category {code} must have a non-zero rate"),
                    rate_rule(code),
                ));
            }

            if code.requires_exemption_reason()
                && subtotal.exemption_reason.is_none()
                && subtotal.exemption_reason_code.is_none()
            {
                errors.push(ValidationError::with_rule(
                    format!("tax_totals[0].subtotals[{i}]"),
                    format!("category {code} requires an exemption reason or reason code"),
                    reason_rule(code),
                ));
            }
        }
    }

    errors
}

fn rate_rule(code: TaxCategoryCode) -> &'static str {
    match code {
        TaxCategoryCode::StandardRate => "BR-S-05",
        TaxCategoryCode::ZeroRated => "BR-Z-05",
        TaxCategoryCode::Exempt => "BR-E-05",
        TaxCategoryCode::ReverseCharge => "BR-AE-05",
        TaxCategoryCode::IntraCommunitySupply => "BR-IC-05",
        TaxCategoryCode::Export => "BR-G-05",
        TaxCategoryCode::NotSubjectToVat => "BR-O-05",
    }
}

fn reason_rule(code: TaxCategoryCode) -> &'static str {
    match code {
        TaxCategoryCode::Exempt => "BR-E-10",
        TaxCategoryCode::ReverseCharge => "BR-AE-10",
        TaxCategoryCode::IntraCommunitySupply => "BR-IC-10",
        TaxCategoryCode::Export => "BR-G-10",
        TaxCategoryCode::NotSubjectToVat => "BR-O-10",
        _ => "BR-E-10",
    }
}

fn check_currency(code: &CurrencyCode, field: &str, errors: &mut Vec<ValidationError>) {
    if code.is_empty() {
        errors.push(ValidationError::with_rule(
            field,
            "currency code must not be empty",
            "BR-05",
        ));
    } else if code.as_str().len() != 3 {
        errors.push(ValidationError::with_rule(
            field,
            "currency code must be 3 characters (ISO 4217)",
            "BR-05",
        ));
    } else if !code.is_known() {
        errors.push(ValidationError::with_rule(
            field,
            format!("currency code '{code}' is not a known ISO 4217 code"),
            "BR-05",
        ));
    }
}

fn check_country(code: &str, field: &str, rule: &str, errors: &mut Vec<ValidationError>) {
    if code.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            field,
            "country code must not be empty",
            rule,
        ));
    } else if !super::countries::is_known_country_code(code) {
        errors.push(ValidationError::with_rule(
            field,
            format!("country code '{code}' is not a known ISO 3166-1 alpha-2 code"),
            rule,
        ));
    }
}

fn check_decimal_places(value: &Decimal, field: &str, errors: &mut Vec<ValidationError>) {
    if *value != value.round_dp(2) {
        errors.push(ValidationError::with_rule(
            field,
            format!("amount {value} has more than 2 decimal places"),
            "BR-DEC-14",
        ));
    }
}
