//! Core invoice types, builders, tax aggregation, and validation.
//!
//! This module provides the foundational types for RO e-Factura invoicing
//! based on the EN 16931 semantic model. Builders derive all document totals
//! at `build()` time; the validation functions cross-check built invoices
//! against the EN 16931 business rules.

mod builder;
mod error;
mod tax;
mod types;
mod validation;

pub mod countries;
pub mod currencies;
pub mod reason_codes;
pub mod units;

pub use builder::*;
pub use countries::is_known_country_code;
pub use currencies::is_known_currency_code;
pub use error::*;
pub use reason_codes::{is_known_allowance_reason, is_known_charge_reason};
pub use tax::*;
pub use types::*;
pub use units::is_known_unit_code;
pub use validation::*;
