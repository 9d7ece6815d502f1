//! UNTDID 5189 / 7161 reason code validation.
//!
//! UNTDID 5189 defines allowance reason codes, UNTDID 7161 defines charge
//! reason codes, used on document-level and line-level allowances/charges
//! in EN 16931 invoicing.

/// Check whether `code` is a known UNTDID 5189 allowance reason code.
pub fn is_known_allowance_reason(code: &str) -> bool {
    ALLOWANCE_REASON_CODES.binary_search(&code).is_ok()
}

/// Check whether `code` is a known UNTDID 7161 charge reason code.
pub fn is_known_charge_reason(code: &str) -> bool {
    CHARGE_REASON_CODES.binary_search(&code).is_ok()
}

/// UNTDID 5189 — Allowance reason codes (sorted for binary search).
static ALLOWANCE_REASON_CODES: &[&str] = &[
    "100", // Special agreement
    "102", // Fixed long term
    "104", // Standard
    "105", // Yearly turnover
    "41",  // Bonus for works ahead of schedule
    "42",  // Other bonus
    "60",  // Manufacturer's consumer discount
    "65",  // Production error discount
    "66",  // New outlet discount
    "67",  // Sample discount
    "68",  // End-of-range discount
    "70",  // Incoterm discount
    "71",  // Point of sales threshold allowance
    "88",  // Material surcharge/deduction
    "95",  // Discount
];

/// UNTDID 7161 — Charge reason codes (sorted for binary search).
static CHARGE_REASON_CODES: &[&str] = &[
    "AAC", // Technical modification
    "AAE", // Outlays
    "ABK", // Miscellaneous
    "ABL", // Additional packaging
    "ADR", // Other services
    "ADT", // Pick-up
    "FC",  // Freight service
    "FI",  // Financing
    "IN",  // Installation
    "LA",  // Labelling
    "PC",  // Packing
    "SH",  // Special handling
    "TS",  // Testing
];
