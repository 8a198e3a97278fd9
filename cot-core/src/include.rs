//! Operator include rules and the per-cycle lookup index.
//!
//! Rules are keyed by transponder hex and/or registration. A hex match always
//! beats a registration match; that tie-break is deliberate, not an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{normalize_key, AircraftRecord};

/// Placeholder values the operator schema uses for "no real value".
pub fn is_placeholder(value: &str) -> bool {
    matches!(value.trim(), "" | "UNKNOWN" | "None")
}

/// One operator-declared override.
///
/// A rule never creates a feature; it only reclassifies or relabels an
/// aircraft already present in the feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRule {
    /// Public-safety domain, informational only (EMS, FIRE, LAW, FED, MIL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// ICAO hex key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    /// Registration (tail number) key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration: Option<String>,
    /// Icon/classification group; drives icon selection.
    #[serde(default = "default_group")]
    pub group: String,
    /// Custom CoT type code, replacing the computed one outright.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cot_type: Option<String>,
    /// Display callsign override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    /// Explicit icon path, short-circuiting the group lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

fn default_group() -> String {
    "UNKNOWN".into()
}

/// Index over a rule list, built once per cycle.
///
/// Two maps instead of repeated linear scans; later rules overwrite earlier
/// ones for a duplicate key.
pub struct IncludeIndex<'a> {
    rules: &'a [IncludeRule],
    by_hex: HashMap<String, usize>,
    by_registration: HashMap<String, usize>,
}

impl<'a> IncludeIndex<'a> {
    pub fn build(rules: &'a [IncludeRule]) -> Self {
        let mut by_hex = HashMap::new();
        let mut by_registration = HashMap::new();

        for (i, rule) in rules.iter().enumerate() {
            if let Some(hex) = rule.hex.as_deref() {
                if !hex.trim().is_empty() {
                    by_hex.insert(normalize_key(hex), i);
                }
            }
            if let Some(reg) = rule.registration.as_deref() {
                if !reg.trim().is_empty() {
                    by_registration.insert(normalize_key(reg), i);
                }
            }
        }

        IncludeIndex {
            rules,
            by_hex,
            by_registration,
        }
    }

    /// Rules in declaration order, for filtered-mode output ordering.
    pub fn rules(&self) -> &'a [IncludeRule] {
        self.rules
    }

    /// Resolve the rule for an aircraft: hex match first, then identity.
    pub fn lookup(&self, hex: Option<&str>, id: &str) -> Option<&'a IncludeRule> {
        if let Some(hex) = hex {
            if let Some(&i) = self.by_hex.get(&normalize_key(hex)) {
                return Some(&self.rules[i]);
            }
        }
        self.by_registration.get(id).map(|&i| &self.rules[i])
    }
}

/// Write a matched rule's join fields into the record's metadata.
///
/// The callsign and icon overrides apply at the feature level and are read
/// from the rule by the feature builder.
pub fn apply_rule(ac: &mut AircraftRecord, rule: &IncludeRule) {
    ac.group = Some(rule.group.clone());
    if let Some(t) = &rule.cot_type {
        ac.cot_type = Some(t.clone());
    }
    if let Some(c) = &rule.comments {
        ac.comments = Some(c.clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
