//! Property-based and edge case tests for the totals engine.

use chrono::NaiveDate;
use efactura::core::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Build a RON invoice from the given lines.
fn build_invoice(lines: Vec<InvoiceLine>) -> Invoice {
    let mut builder = InvoiceBuilder::new("EF-PROP", date(2024, 6, 15));
    for line in lines {
        builder = builder.add_line(line);
    }
    builder.build().unwrap()
}

// ── Proptest Strategies ─────────────────────────────────────────────────────

/// Generate a price between 0.01 and 99999.99.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (1u64..10_000_000u64).prop_map(|cents| Decimal::new(cents as i64, 2))
}

/// Generate a quantity between −50 and 100, excluding zero-only noise
/// (zero quantities are legal for the engine, they just zero the line).
fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (-50i64..=100i64).prop_map(Decimal::from)
}

/// Generate a well-formed tax category: standard RO rates or zero-rated.
fn arb_tax() -> impl Strategy<Value = TaxCategory> {
    prop_oneof![
        Just(TaxCategory::new(TaxCategoryCode::ZeroRated, dec!(0))),
        Just(TaxCategory::standard(dec!(5))),
        Just(TaxCategory::standard(dec!(9))),
        Just(TaxCategory::standard(dec!(19))),
    ]
}

/// Generate a valid invoice line with the given id.
fn arb_line(id: usize) -> impl Strategy<Value = InvoiceLine> {
    (arb_quantity(), arb_price(), arb_tax()).prop_map(move |(quantity, price, tax)| {
        InvoiceLineBuilder::new(format!("{}", id + 1))
            .currency("RON")
            .item_name(format!("Articol {}", id + 1))
            .quantity(quantity)
            .unit("C62")
            .gross_price(price)
            .tax(tax)
            .build()
            .unwrap()
    })
}

/// Generate 1-6 valid invoice lines with unique ids.
fn arb_lines() -> impl Strategy<Value = Vec<InvoiceLine>> {
    prop::collection::vec(arb_line(0), 1..=6).prop_map(|mut lines| {
        for (i, line) in lines.iter_mut().enumerate() {
            line.id = format!("{}", i + 1);
        }
        lines
    })
}

// ── Property Tests ──────────────────────────────────────────────────────────

proptest! {
    /// BT-112 equals BT-109 plus the document tax total, exactly.
    #[test]
    fn tax_inclusive_is_exclusive_plus_tax(lines in arb_lines()) {
        let invoice = build_invoice(lines);
        let tax: Decimal = invoice.tax_total().unwrap().tax_amount;
        prop_assert_eq!(
            invoice.totals.tax_inclusive_amount,
            invoice.totals.tax_exclusive_amount + tax
        );
    }

    /// BT-106 equals the sum of the line net amounts, exactly.
    #[test]
    fn line_total_is_sum_of_lines(lines in arb_lines()) {
        let invoice = build_invoice(lines);
        let sum: Decimal = invoice.lines.iter().map(|l| l.line_extension_amount).sum();
        prop_assert_eq!(invoice.totals.line_extension_amount, sum);
    }

    /// The tax total equals the sum of its subtotals, and each subtotal
    /// satisfies tax = round2(base × rate ÷ 100).
    #[test]
    fn subtotals_are_consistent(lines in arb_lines()) {
        let invoice = build_invoice(lines);
        let errors = validate_arithmetic(&invoice);
        prop_assert!(errors.is_empty(), "arithmetic errors: {errors:?}");
    }

    /// Reordering lines never changes the derived totals.
    #[test]
    fn line_order_is_irrelevant(lines in arb_lines()) {
        let forward = build_invoice(lines.clone());

        let mut reversed_lines = lines;
        reversed_lines.reverse();
        let reversed = build_invoice(reversed_lines);

        prop_assert_eq!(&forward.totals, &reversed.totals);
        prop_assert_eq!(&forward.tax_totals, &reversed.tax_totals);
    }

    /// Building the same inputs twice yields identical invoices — no hidden
    /// state, no ordering noise from the bucket map.
    #[test]
    fn build_is_deterministic(lines in arb_lines()) {
        let first = build_invoice(lines.clone());
        let second = build_invoice(lines);
        prop_assert_eq!(first, second);
    }

    /// A zero base quantity always fails, whatever the other inputs.
    #[test]
    fn zero_base_quantity_always_fails(quantity in arb_quantity(), price in arb_price()) {
        let result = InvoiceLineBuilder::new("1")
            .currency("RON")
            .item_name("Articol")
            .quantity(quantity)
            .unit("C62")
            .gross_price(price)
            .base_quantity(Decimal::ZERO)
            .tax(TaxCategory::standard(dec!(19)))
            .build();
        prop_assert!(matches!(result, Err(BuildError::ZeroBaseQuantity { .. })), "expected ZeroBaseQuantity error");
    }

    /// A rate-exempted category with a non-zero percent always fails
    /// aggregation, whatever the base amount.
    #[test]
    fn exempted_category_with_rate_always_fails(base in arb_price()) {
        let mut aggregator = TaxAggregator::new();
        let result = aggregator.add(&TaxCategory::new(TaxCategoryCode::Exempt, dec!(19)), base);
        prop_assert!(matches!(result, Err(BuildError::ExemptedRateNotZero { .. })), "expected ExemptedRateNotZero error");
    }

    /// The standard category with a zero percent always fails aggregation.
    #[test]
    fn standard_category_without_rate_always_fails(base in arb_price()) {
        let mut aggregator = TaxAggregator::new();
        let result = aggregator.add(&TaxCategory::standard(Decimal::ZERO), base);
        prop_assert!(matches!(result, Err(BuildError::StandardRateZero { .. })), "expected StandardRateZero error");
    }
}

// ── Edge Case Tests ─────────────────────────────────────────────────────────

#[test]
fn missing_tax_scheme_always_fails() {
    let result = InvoiceLineBuilder::new("1")
        .currency("RON")
        .item_name("Articol")
        .quantity(dec!(1))
        .unit("C62")
        .gross_price(dec!(10))
        .tax(TaxCategory::standard(dec!(19)).with_scheme("  "))
        .build();

    assert!(matches!(
        result,
        Err(BuildError::MissingField {
            field: "tax scheme",
            ..
        })
    ));
}

#[test]
fn zero_quantity_line_is_legal() {
    let invoice = InvoiceBuilder::new("EF-ZERO", date(2024, 6, 15))
        .add_line(
            InvoiceLineBuilder::new("1")
                .currency("RON")
                .item_name("Mostră gratuită")
                .quantity(dec!(0))
                .unit("C62")
                .gross_price(dec!(10))
                .tax(TaxCategory::standard(dec!(19)))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    assert_eq!(invoice.totals.payable_amount, dec!(0));
}

#[test]
fn fully_credited_invoice_nets_to_zero() {
    let invoice = InvoiceBuilder::new("EF-STORNO", date(2024, 6, 15))
        .type_code(InvoiceTypeCode::CreditNote)
        .add_line(
            InvoiceLineBuilder::new("1")
                .currency("RON")
                .item_name("Serviciu")
                .quantity(dec!(4))
                .unit("HUR")
                .gross_price(dec!(250))
                .tax(TaxCategory::standard(dec!(19)))
                .build()
                .unwrap(),
        )
        .add_line(
            InvoiceLineBuilder::new("2")
                .currency("RON")
                .item_name("Stornare serviciu")
                .quantity(dec!(-4))
                .unit("HUR")
                .gross_price(dec!(250))
                .tax(TaxCategory::standard(dec!(19)))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    assert_eq!(invoice.totals.line_extension_amount, dec!(0.00));
    assert_eq!(invoice.tax_total().unwrap().tax_amount, dec!(0.00));
    assert_eq!(invoice.totals.payable_amount, dec!(0.00));
}

#[test]
fn unicode_names_flow_through() {
    let scenarios = [
        ("Societatea Țâru SRL", "Mărgelatu SA"),
        ("日本語会社", "東京株式会社"),
        ("Compañía S.L.", "José García"),
    ];

    for (supplier_name, customer_name) in scenarios {
        let invoice = InvoiceBuilder::new("EF-UNI", date(2024, 6, 15))
            .supplier(
                PartyBuilder::new(
                    supplier_name,
                    AddressBuilder::new("București", "RO").build(),
                )
                .build(),
            )
            .customer(
                PartyBuilder::new(customer_name, AddressBuilder::new("Iași", "RO").build())
                    .build(),
            )
            .add_line(
                InvoiceLineBuilder::new("1")
                    .currency("RON")
                    .item_name("Serviciu")
                    .quantity(dec!(1))
                    .unit("C62")
                    .gross_price(dec!(100))
                    .tax(TaxCategory::standard(dec!(19)))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        assert_eq!(invoice.supplier.as_ref().unwrap().name, supplier_name);
        assert_eq!(invoice.customer.as_ref().unwrap().name, customer_name);
    }
}

#[test]
fn large_amounts_round_correctly() {
    let invoice = InvoiceBuilder::new("EF-BIG", date(2024, 6, 15))
        .add_line(
            InvoiceLineBuilder::new("1")
                .currency("RON")
                .item_name("Licență enterprise")
                .quantity(dec!(1))
                .unit("C62")
                .gross_price(dec!(999999.99))
                .tax(TaxCategory::standard(dec!(19)))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    // 999999.99 × 0.19 = 189999.9981 → 190000.00
    assert_eq!(invoice.tax_total().unwrap().tax_amount, dec!(190000.00));
    assert_eq!(invoice.totals.tax_inclusive_amount, dec!(1189999.99));
}

#[test]
fn prepaid_exceeding_total_goes_negative() {
    let invoice = InvoiceBuilder::new("EF-PRE", date(2024, 6, 15))
        .add_line(
            InvoiceLineBuilder::new("1")
                .currency("RON")
                .item_name("Serviciu")
                .quantity(dec!(1))
                .unit("C62")
                .gross_price(dec!(100))
                .tax(TaxCategory::standard(dec!(19)))
                .build()
                .unwrap(),
        )
        .prepaid(dec!(200))
        .build()
        .unwrap();

    assert_eq!(invoice.totals.tax_inclusive_amount, dec!(119.00));
    assert_eq!(invoice.totals.payable_amount, dec!(-81.00)); // overpayment
    assert!(validate_arithmetic(&invoice).is_empty());
}

#[test]
fn many_lines_aggregate_into_one_bucket() {
    let mut builder = InvoiceBuilder::new("EF-MANY", date(2024, 6, 15));
    for i in 1..=100 {
        builder = builder.add_line(
            InvoiceLineBuilder::new(format!("{i}"))
                .currency("RON")
                .item_name(format!("Articol {i}"))
                .quantity(dec!(1))
                .unit("C62")
                .gross_price(dec!(10))
                .tax(TaxCategory::standard(dec!(19)))
                .build()
                .unwrap(),
        );
    }

    let invoice = builder.build().unwrap();
    assert_eq!(invoice.lines.len(), 100);
    assert_eq!(invoice.totals.line_extension_amount, dec!(1000.00));
    assert_eq!(invoice.tax_total().unwrap().subtotals.len(), 1);
    assert_eq!(invoice.tax_total().unwrap().tax_amount, dec!(190.00));
}
