//! UN/CEFACT Recommendation 20 unit codes.
//!
//! Lookup of the unit codes most often used on invoice lines. The full
//! Rec 20 list has ~2000 entries; this covers the subset relevant to
//! EN 16931 invoicing.

/// Check whether `code` is a known UN/CEFACT Rec 20 unit code.
pub fn is_known_unit_code(code: &str) -> bool {
    COMMON_UNIT_CODES.binary_search(&code).is_ok()
}

/// Sorted list of common UN/CEFACT Rec 20 unit codes.
/// Sorted for binary search.
static COMMON_UNIT_CODES: &[&str] = &[
    "ANN", // Year
    "C62", // One (piece/unit)
    "CMT", // Centimetre
    "DAY", // Day
    "DZN", // Dozen
    "EA",  // Each
    "GRM", // Gram
    "H87", // Piece
    "HUR", // Hour
    "KGM", // Kilogram
    "KMT", // Kilometre
    "KWH", // Kilowatt-hour
    "LS",  // Lump sum
    "LTR", // Litre
    "MIN", // Minute
    "MLT", // Millilitre
    "MMT", // Millimetre
    "MON", // Month
    "MTK", // Square metre
    "MTQ", // Cubic metre
    "MTR", // Metre
    "MWH", // Megawatt-hour
    "NAR", // Number of articles
    "P1",  // Percent
    "PR",  // Pair
    "SET", // Set
    "TNE", // Tonne
    "WEE", // Week
    "XBX", // Box
    "XPK", // Package
    "XPP", // Unpacked article
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_units() {
        assert!(is_known_unit_code("C62"));
        assert!(is_known_unit_code("HUR"));
        assert!(is_known_unit_code("KGM"));
        assert!(is_known_unit_code("H87"));
    }

    #[test]
    fn unknown_units() {
        assert!(!is_known_unit_code("BUC"));
        assert!(!is_known_unit_code(""));
        assert!(!is_known_unit_code("c62"));
    }

    #[test]
    fn list_is_sorted() {
        for window in COMMON_UNIT_CODES.windows(2) {
            assert!(
                window[0] < window[1],
                "unit codes not sorted: {} >= {}",
                window[0],
                window[1]
            );
        }
    }
}
