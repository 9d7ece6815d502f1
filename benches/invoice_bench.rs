use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use efactura::core::*;

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn line(id: usize, percent: rust_decimal::Decimal) -> InvoiceLine {
    InvoiceLineBuilder::new(format!("{id}"))
        .currency("RON")
        .item_name(format!("Articol {id}"))
        .quantity(dec!(5))
        .unit("C62")
        .gross_price(dec!(120))
        .tax(TaxCategory::standard(percent))
        .build()
        .unwrap()
}

fn build_invoice(line_count: usize) -> Invoice {
    let mut builder = InvoiceBuilder::new("EF-BENCH", test_date())
        .supplier(
            PartyBuilder::new(
                "Furnizor Bench SRL",
                AddressBuilder::new("București", "RO")
                    .street("Str. Exemplu 1")
                    .build(),
            )
            .vat_id("RO12345678")
            .build(),
        )
        .customer(
            PartyBuilder::new("Client Bench SA", AddressBuilder::new("Cluj-Napoca", "RO").build())
                .build(),
        );

    // Mix the three standard RO rates so aggregation produces several buckets.
    let rates = [dec!(19), dec!(9), dec!(5)];
    for i in 1..=line_count {
        builder = builder.add_line(line(i, rates[i % rates.len()]));
    }
    builder.build().unwrap()
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_invoice_10_lines", |b| {
        b.iter(|| black_box(build_invoice(10)))
    });

    c.bench_function("build_invoice_100_lines", |b| {
        b.iter(|| black_box(build_invoice(100)))
    });
}

fn bench_validate(c: &mut Criterion) {
    let invoice = build_invoice(100);

    c.bench_function("validate_arithmetic_100_lines", |b| {
        b.iter(|| black_box(validate_arithmetic(black_box(&invoice))))
    });
}

criterion_group!(benches, bench_build, bench_validate);
criterion_main!(benches);
