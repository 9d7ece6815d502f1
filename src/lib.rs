//! # efactura
//!
//! Invoice construction and tax aggregation for RO e-Factura, built on the
//! [EN 16931](https://standards.cencenelec.eu/dyn/www/f?p=205:110:0::::FSP_PROJECT:60602)
//! semantic model (UBL 2.1 terms).
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//! Builders check required fields and derive every document total
//! (BT-106…BT-115) together with the per-category VAT breakdown, so a
//! downstream serializer consumes a built [`Invoice`] without re-deriving or
//! re-validating any amount.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use efactura::core::*;
//! use rust_decimal_macros::dec;
//!
//! let invoice = InvoiceBuilder::new("EF-2024-0001", NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
//!     .supplier(
//!         PartyBuilder::new("Furnizor SRL", AddressBuilder::new("București", "RO").build())
//!             .vat_id("RO12345678")
//!             .build(),
//!     )
//!     .customer(PartyBuilder::new("Client SA", AddressBuilder::new("Cluj-Napoca", "RO").build()).build())
//!     .add_line(
//!         InvoiceLineBuilder::new("1")
//!             .currency("RON")
//!             .item_name("Servicii consultanță")
//!             .quantity(dec!(10))
//!             .unit("HUR")
//!             .gross_price(dec!(150))
//!             .tax(TaxCategory::standard(dec!(19)))
//!             .build()
//!             .unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(invoice.totals.tax_inclusive_amount, dec!(1785.00));
//! assert!(validate_arithmetic(&invoice).is_empty());
//! ```

pub mod core;

// Re-export core types at crate root for convenience
pub use crate::core::*;
