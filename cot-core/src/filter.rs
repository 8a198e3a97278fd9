//! Output set selection — include-list filtering or pass-through.

use std::collections::{HashMap, HashSet};

use crate::include::IncludeIndex;
use crate::types::{normalize_key, Feature};

/// Restrict a built feature set to aircraft matched by an include rule.
///
/// Filtered output follows rule-declaration order, each feature at most once
/// even when matched by several criteria. With `filtering` off the whole set
/// passes through (already one feature per identity).
pub fn filter_features(
    features: Vec<Feature>,
    index: &IncludeIndex,
    filtering: bool,
) -> Vec<Feature> {
    if !filtering {
        return features;
    }

    // Feature lookup by identity and by transponder hex.
    let mut hex_to_id: HashMap<String, String> = HashMap::new();
    for feat in &features {
        if let Some(hex) = feat.properties.metadata.hex.as_deref() {
            hex_to_id.insert(normalize_key(hex), feat.id.clone());
        }
    }
    let mut by_id: HashMap<String, Feature> = features
        .into_iter()
        .map(|f| (f.id.clone(), f))
        .collect();

    let mut taken: HashSet<String> = HashSet::new();
    let mut out: Vec<Feature> = Vec::new();

    for rule in index.rules() {
        // A rule may match one aircraft by hex and another by registration;
        // both belong in the output.
        let hex_hit = rule
            .hex
            .as_deref()
            .and_then(|h| hex_to_id.get(&normalize_key(h)))
            .cloned();
        let reg_hit = rule
            .registration
            .as_deref()
            .map(|r| normalize_key(r))
            .filter(|id| by_id.contains_key(id));

        for id in hex_hit.into_iter().chain(reg_hit) {
            if taken.insert(id.clone()) {
                if let Some(feat) = by_id.remove(&id) {
                    out.push(feat);
                }
            }
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
