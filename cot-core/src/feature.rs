//! Feature assembly — coordinates, kinematics, remarks, icon, alert detail.
//!
//! Pure functions over immutable record slices. The caller owns all I/O.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::classify::{classify, is_emergency, HexRange};
use crate::icons::icon_for_group;
use crate::include::{apply_rule, is_placeholder, IncludeIndex, IncludeRule};
use crate::types::*;

/// Per-cycle build settings, resolved once from configuration.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub domestic: HexRange,
    /// Attach the red alert detail to aircraft in emergency status.
    pub emergency_alert: bool,
    /// Resolve Public Safety Air icons from the joined group.
    pub use_icons: bool,
    /// Skip tower and ground-vehicle transponders.
    pub ignore_ground_vehicles: bool,
}

/// Tower/ground equipment shows up with pseudo-registrations or a
/// non-transmitting source type.
fn is_ground_equipment(ac: &AircraftRecord) -> bool {
    matches!(ac.registration.as_deref(), Some("TWR") | Some("GND"))
        || ac.source.as_deref() == Some("adsb_icao_nt")
}

/// Ordered remarks block. Labels with nothing to say are omitted.
fn build_remarks(ac: &AircraftRecord) -> String {
    let or_unknown = |v: &Option<String>| -> String {
        match v.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => "Unknown".to_string(),
        }
    };

    let mut lines = vec![
        format!("Flight: {}", or_unknown(&ac.flight)),
        format!("Registration: {}", or_unknown(&ac.registration)),
        format!("Type: {}", or_unknown(&ac.airframe)),
        format!("Category: {}", or_unknown(&ac.category)),
    ];
    if let Some(alt) = &ac.alt_baro {
        lines.push(format!("Alt Baro: {}", alt.display()));
    }
    if let Some(alt) = &ac.alt_geom {
        lines.push(format!("Alt Geom: {}", alt.display()));
    }
    lines.push(format!("Emergency: {}", or_unknown(&ac.emergency)));
    lines.push(format!("Squawk: {}", or_unknown(&ac.squawk)));
    if let Some(group) = ac.group.as_deref() {
        if !is_placeholder(group) {
            lines.push(format!("Group: {}", group.trim().replace('_', "-")));
        }
    }
    if let Some(comments) = ac.comments.as_deref() {
        if !comments.trim().is_empty() {
            lines.push(format!("Comments: {}", comments.trim()));
        }
    }

    lines.join("\n")
}

/// Assemble one feature from a record and its (possibly absent) include rule.
///
/// `id` is the already-derived non-empty identity. The record is copied and
/// the rule's join fields written into the embedded metadata before anything
/// else reads it.
pub fn build_feature(
    ac: &AircraftRecord,
    id: &str,
    rule: Option<&IncludeRule>,
    opts: &BuildOptions,
    now: DateTime<Utc>,
) -> Feature {
    let mut ac = ac.clone();
    if let Some(rule) = rule {
        apply_rule(&mut ac, rule);
    }

    let mut coordinates = vec![ac.lon, ac.lat];
    if let Some(feet) = ac.alt_geom.as_ref().and_then(AltValue::as_feet) {
        coordinates.push(feet * FEET_TO_METERS);
    }

    let mut cot_type = classify(&ac, &opts.domestic);
    if let Some(custom) = ac.cot_type.as_deref() {
        if !is_placeholder(custom) {
            cot_type = custom.trim().to_string();
        }
    }

    let callsign = rule
        .and_then(|r| r.callsign.clone())
        .unwrap_or_else(|| ac.flight.as_deref().unwrap_or("").trim().to_string());

    let icon = if opts.use_icons {
        resolve_icon(&ac, id, rule)
    } else {
        None
    };

    let detail = (is_emergency(&ac) && opts.emergency_alert).then(AlertDetail::red);

    // Position timestamp: now minus the provider's position age.
    let seen = now - Duration::milliseconds((ac.seen_pos * 1000.0) as i64);

    Feature {
        id: id.to_string(),
        kind: "Feature".into(),
        properties: FeatureProperties {
            cot_type,
            callsign,
            time: seen,
            start: seen,
            stale: None,
            speed: ac.gs.map_or(UNKNOWN_SPEED, |gs| gs * KNOTS_TO_MPS),
            course: ac.track.unwrap_or(UNKNOWN_COURSE),
            remarks: build_remarks(&ac),
            icon,
            detail,
            metadata: ac,
        },
        geometry: PointGeometry::new(coordinates),
    }
}

fn resolve_icon(ac: &AircraftRecord, id: &str, rule: Option<&IncludeRule>) -> Option<String> {
    if let Some(explicit) = rule.and_then(|r| r.icon.as_deref()) {
        if !explicit.trim().is_empty() {
            return Some(explicit.trim().to_string());
        }
    }
    let group = ac.group.as_deref()?;
    if is_placeholder(group) {
        return None;
    }
    match icon_for_group(group) {
        Some(path) => Some(path),
        None => {
            warn!("unknown icon group {group:?} for aircraft {id}, using default icon");
            None
        }
    }
}

/// Run classify + join + build over a snapshot.
///
/// Records without an identity are dropped; a later record with the same
/// identity overwrites the earlier feature in place (last write wins, at most
/// one feature per identity).
pub fn build_feature_set(
    records: &[AircraftRecord],
    index: &IncludeIndex,
    opts: &BuildOptions,
    now: DateTime<Utc>,
) -> Vec<Feature> {
    let mut features: Vec<Feature> = Vec::new();
    let mut slot_by_id: HashMap<String, usize> = HashMap::new();

    for ac in records {
        if opts.ignore_ground_vehicles && is_ground_equipment(ac) {
            continue;
        }
        let Some(id) = feature_id(ac.registration.as_deref(), ac.flight.as_deref()) else {
            continue;
        };

        let rule = index.lookup(ac.hex.as_deref(), &id);
        let feature = build_feature(ac, &id, rule, opts, now);

        match slot_by_id.get(&id) {
            Some(&slot) => features[slot] = feature,
            None => {
                slot_by_id.insert(id, features.len());
                features.push(feature);
            }
        }
    }

    features
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
