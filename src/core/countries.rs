//! ISO 3166-1 alpha-2 country code validation.
//!
//! Lookup of the country codes accepted in party addresses (EN 16931
//! BR-11/BR-12). Covers Europe and the non-European countries most common
//! on Romanian invoices; extend as needed.

/// Check whether `code` is a known ISO 3166-1 alpha-2 country code.
pub fn is_known_country_code(code: &str) -> bool {
    COUNTRY_CODES.binary_search(&code).is_ok()
}

/// Sorted list of accepted ISO 3166-1 alpha-2 country codes.
/// Sorted for binary search.
static COUNTRY_CODES: &[&str] = &[
    "AD", "AE", "AL", "AM", "AT", "AU", "AZ", "BA", "BE", "BG", "BR", "BY", "CA", "CH", "CN",
    "CY", "CZ", "DE", "DK", "EE", "EG", "ES", "FI", "FR", "GB", "GE", "GR", "HR", "HU", "IE",
    "IL", "IN", "IS", "IT", "JP", "KR", "KZ", "LI", "LT", "LU", "LV", "MA", "MC", "MD", "ME",
    "MK", "MT", "MX", "NL", "NO", "NZ", "PL", "PT", "RO", "RS", "RU", "SA", "SE", "SG", "SI",
    "SK", "SM", "TN", "TR", "UA", "US", "VA", "XK", "ZA",
];
