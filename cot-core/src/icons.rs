//! Public Safety Air icon set lookup.
//!
//! Icon paths resolve from the include-rule group against a fixed allow-list;
//! anything outside the list keeps the default map icon.

/// TAK icon-set base path for Public Safety Air.
pub const ICON_SET_PATH: &str = "66f14976-4b62-4023-8edb-d8d2ebeaa336/Public Safety Air/";

/// Groups with an icon in the Public Safety Air set.
const ICON_GROUPS: &[&str] = &[
    "a-f-A-M-F-A",
    "a-f-A-M-F-C",
    "a-f-A-M-F-J",
    "a-f-A-M-F-O",
    "a-f-A-M-F-Q",
    "a-f-A-M-F-R-Z",
    "a-f-A-M-F-R",
    "a-f-A-M-F-U",
    "a-f-A-M-F-V",
    "a-f-A-M-F-WX",
    "a-f-A-M-F-Y",
    "a-f-A-M-H-H",
    "a-f-A-M-H-R",
    "a-f-A-M-H-V",
    "a-f-A-M-H",
    "a-n-A-M-F-V",
    "CIV_FIXED_CAP",
    "CIV_FIXED_ISR",
    "CIV_LTA_AIRSHIP",
    "CIV_LTA_BALLOON",
    "CIV_LTA_TETHERED",
    "CIV_ROTOR_ISR",
    "CIV_UAS",
    "CIV_UAS_ROTOR",
    "EMS_FIXED_WING",
    "EMS_ROTOR",
    "EMS_ROTOR_RESCUE",
    "FIRE_AIR_ATTACK",
    "FIRE_AIR_TANKER",
    "FIRE_INTEL",
    "FIRE_LEAD_PLANE",
    "FIRE_MULTI_USE",
    "FIRE_ROTOR",
    "FIRE_ROTOR_AIR_ATTACK",
    "FIRE_ROTOR_INTEL",
    "FIRE_ROTOR_RESCUE",
    "FIRE_SEAT",
    "FIRE_SMOKE_JMPR",
    "FIRE_UAS",
    "LE_FIXED_WING",
    "LE_FIXED_WING_ISR",
    "LE_ROTOR",
    "LE_ROTOR_RESCUE",
    "LE_UAS",
    "FED_FIXED_WING",
    "FED_FIXED_WING_ISR",
    "FED_ROTOR",
    "FED_ROTOR_RESCUE",
    "FED_UAS",
    "MIL_ROTOR_MED_RESCUE",
    "MIL_ROTOR_ISR_RESCUE",
];

/// Icon path for a group, or `None` when the group is not in the set.
pub fn icon_for_group(group: &str) -> Option<String> {
    let group = group.trim();
    ICON_GROUPS
        .iter()
        .find(|g| **g == group)
        .map(|g| format!("{ICON_SET_PATH}{g}.png"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_group() {
        assert_eq!(
            icon_for_group("FIRE_ROTOR").as_deref(),
            Some("66f14976-4b62-4023-8edb-d8d2ebeaa336/Public Safety Air/FIRE_ROTOR.png")
        );
    }

    #[test]
    fn test_trims_group() {
        assert!(icon_for_group(" EMS_ROTOR ").is_some());
    }

    #[test]
    fn test_unknown_group() {
        assert!(icon_for_group("SPACE_LASER").is_none());
        assert!(icon_for_group("").is_none());
    }
}
