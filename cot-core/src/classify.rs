//! CoT symbology classification from ADS-B attributes.
//!
//! Builds the four-part type code `a<affiliation>-A<civ/mil><platform>` from
//! the ICAO hex range test, the database military flag, and the emitter
//! category.

use crate::types::{AircraftRecord, CotError, Result};

/// Inclusive ICAO hex range for domestic registrations.
///
/// Hex codes compare by 24-bit integer value, so case and leading-zero
/// omission are irrelevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexRange {
    pub start: u32,
    pub end: u32,
}

impl HexRange {
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = hex_value(start)
            .ok_or_else(|| CotError::Config(format!("invalid hex range start: {start:?}")))?;
        let end = hex_value(end)
            .ok_or_else(|| CotError::Config(format!("invalid hex range end: {end:?}")))?;
        Ok(HexRange { start, end })
    }

    /// Range test; unparseable or missing hex is never in range.
    pub fn contains(&self, hex: &str) -> bool {
        match hex_value(hex) {
            Some(v) => v >= self.start && v <= self.end,
            None => false,
        }
    }
}

/// 24-bit value of a transponder hex string. `None` for anything that is not
/// 1-6 hex digits after trimming.
fn hex_value(hex: &str) -> Option<u32> {
    let hex = hex.trim();
    if hex.is_empty() || hex.len() > 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Platform suffix from the ADS-B emitter category.
///
/// A0-A6 cover fixed-wing classes (A0 carries no category information but is
/// still used by some airplanes), A7 is any rotorcraft, B2 any
/// lighter-than-air. Everything else is an unknown platform.
pub fn platform_suffix(category: Option<&str>) -> &'static str {
    match category.map(str::trim) {
        Some("A0" | "A1" | "A2" | "A3" | "A4" | "A5" | "A6") => "-F",
        Some("A7") => "-H",
        Some("B2") => "-L",
        _ => "",
    }
}

/// Whether the record reports an active emergency.
pub fn is_emergency(ac: &AircraftRecord) -> bool {
    ac.emergency
        .as_deref()
        .is_some_and(|e| !e.trim().is_empty() && e.trim() != "none")
}

/// Derive the CoT type code for one aircraft.
///
/// Affiliation resolves from the domestic range test first, then the military
/// flag (odd `dbFlags`) refines it: domestic military stays friendly, foreign
/// military becomes unknown rather than neutral.
pub fn classify(ac: &AircraftRecord, domestic: &HexRange) -> String {
    let in_range = ac
        .hex
        .as_deref()
        .is_some_and(|h| domestic.contains(h));
    let military = ac.db_flags.is_some_and(|f| f % 2 != 0);

    let (affiliation, civmil) = match (military, in_range) {
        (false, true) => ("-f", "-C"),
        (false, false) => ("-n", "-C"),
        (true, true) => ("-f", "-M"),
        (true, false) => ("-u", "-M"),
    };

    format!(
        "a{affiliation}-A{civmil}{}",
        platform_suffix(ac.category.as_deref())
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn nz_range() -> HexRange {
        HexRange::parse("C80000", "C87FFF").unwrap()
    }

    fn record(hex: Option<&str>, category: Option<&str>, db_flags: Option<u32>) -> AircraftRecord {
        AircraftRecord {
            hex: hex.map(String::from),
            category: category.map(String::from),
            db_flags,
            ..Default::default()
        }
    }

    #[test]
    fn test_hex_range_parse() {
        let r = HexRange::parse("C80000", "C87FFF").unwrap();
        assert_eq!(r.start, 0xC80000);
        assert_eq!(r.end, 0xC87FFF);
        assert!(HexRange::parse("XYZ", "C87FFF").is_err());
        assert!(HexRange::parse("C80000", "").is_err());
    }

    #[test]
    fn test_range_inclusive_bounds() {
        let r = nz_range();
        assert!(r.contains("C80000"));
        assert!(r.contains("C87FFF"));
        assert!(!r.contains("C7FFFF"));
        assert!(!r.contains("C88000"));
    }

    #[test]
    fn test_range_case_and_padding() {
        let r = nz_range();
        assert!(r.contains("c84a2f"));
        assert!(r.contains(" C84A2F "));
        // Leading-zero omission: 0x00400F == "400F".
        let small = HexRange::parse("004000", "0043FF").unwrap();
        assert!(small.contains("400F"));
        assert!(small.contains("00400F"));
    }

    #[test]
    fn test_range_rejects_garbage() {
        let r = nz_range();
        assert!(!r.contains(""));
        assert!(!r.contains("not-hex"));
        assert!(!r.contains("C800000")); // 7 digits, beyond 24 bits
    }

    #[test]
    fn test_platform_suffix() {
        for cat in ["A0", "A1", "A2", "A3", "A4", "A5", "A6"] {
            assert_eq!(platform_suffix(Some(cat)), "-F");
        }
        assert_eq!(platform_suffix(Some("A7")), "-H");
        assert_eq!(platform_suffix(Some("B2")), "-L");
        assert_eq!(platform_suffix(Some("B1")), "");
        assert_eq!(platform_suffix(Some("C1")), "");
        assert_eq!(platform_suffix(None), "");
    }

    #[test]
    fn test_classify_domestic_civilian() {
        let ac = record(Some("C84A2F"), Some("A3"), None);
        assert_eq!(classify(&ac, &nz_range()), "a-f-A-C-F");
    }

    #[test]
    fn test_classify_foreign_civilian() {
        let ac = record(Some("A00001"), Some("A7"), Some(0));
        assert_eq!(classify(&ac, &nz_range()), "a-n-A-C-H");
    }

    #[test]
    fn test_classify_domestic_military() {
        let ac = record(Some("C84A2F"), Some("A3"), Some(1));
        assert_eq!(classify(&ac, &nz_range()), "a-f-A-M-F");
    }

    #[test]
    fn test_classify_foreign_military() {
        let ac = record(Some("A00001"), Some("B2"), Some(7));
        assert_eq!(classify(&ac, &nz_range()), "a-u-A-M-L");
    }

    #[test]
    fn test_classify_even_db_flags_is_civilian() {
        let ac = record(Some("C84A2F"), Some("A1"), Some(4));
        assert_eq!(classify(&ac, &nz_range()), "a-f-A-C-F");
    }

    #[test]
    fn test_classify_missing_hex_is_neutral() {
        let ac = record(None, Some("A1"), None);
        assert_eq!(classify(&ac, &nz_range()), "a-n-A-C-F");
        let ac = record(None, None, Some(1));
        assert_eq!(classify(&ac, &nz_range()), "a-u-A-M");
    }

    #[test]
    fn test_classify_unknown_platform_has_no_suffix() {
        let ac = record(Some("C84A2F"), None, None);
        assert_eq!(classify(&ac, &nz_range()), "a-f-A-C");
    }

    #[test]
    fn test_is_emergency() {
        let mut ac = AircraftRecord::default();
        assert!(!is_emergency(&ac));
        ac.emergency = Some("none".into());
        assert!(!is_emergency(&ac));
        ac.emergency = Some("squawk".into());
        assert!(is_emergency(&ac));
        ac.emergency = Some("".into());
        assert!(!is_emergency(&ac));
    }
}
