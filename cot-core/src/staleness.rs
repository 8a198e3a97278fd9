//! Loss-of-contact detection over the previously known feature snapshot.
//!
//! Read-only against the current cycle and the known state; the only output
//! is the list of emitted alerts. Per tracked identity the states are
//! ACTIVE (present this cycle), WATCHED (silent but inside the alert
//! window), and EXPIRED (silent too long, no longer considered).

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Feature;

/// Silence shorter than this is not yet suspicious.
const WATCH_MIN_SECS: i64 = 60;

/// Silence at least this long has expired from consideration.
const WATCH_MAX_SECS: i64 = 600;

/// TTL applied to hostile-marked alert features.
const ALERT_STALE_HOURS: i64 = 4;

/// Notification icon identifier for loss-of-contact alerts.
pub const ALERT_ICON: &str = "contact-lost";

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Alert escalation level, derived from the silence duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Green,
    Yellow,
    Red,
}

impl std::fmt::Display for AlertPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertPriority::Green => write!(f, "green"),
            AlertPriority::Yellow => write!(f, "yellow"),
            AlertPriority::Red => write!(f, "red"),
        }
    }
}

/// Priority from elapsed silence: up to 2 minutes green, up to 8 yellow,
/// beyond that red.
pub fn priority_for(silence: Duration) -> AlertPriority {
    let secs = silence.num_seconds();
    if secs <= 120 {
        AlertPriority::Green
    } else if secs <= 480 {
        AlertPriority::Yellow
    } else {
        AlertPriority::Red
    }
}

// ---------------------------------------------------------------------------
// Alert events
// ---------------------------------------------------------------------------

/// One loss-of-contact alert.
#[derive(Debug, Clone)]
pub struct AlertEvent {
    /// Identity of the missing aircraft.
    pub id: String,
    /// How long the aircraft has been silent.
    pub silence: Duration,
    pub priority: AlertPriority,
    pub description: String,
    /// Hostile-marked clone of the last-known feature, carrying the
    /// last-known position.
    pub feature: Feature,
}

/// Discrete notification payload for an alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertNotification {
    pub title: String,
    pub icon: String,
    pub description: String,
    pub priority: AlertPriority,
}

impl AlertEvent {
    pub fn notification(&self) -> AlertNotification {
        AlertNotification {
            title: format!("Loss of contact: {}", self.display_name()),
            icon: ALERT_ICON.into(),
            description: self.description.clone(),
            priority: self.priority,
        }
    }

    fn display_name(&self) -> &str {
        let callsign = self.feature.properties.callsign.trim();
        if callsign.is_empty() {
            &self.id
        } else {
            callsign
        }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Compare the known snapshot against the current cycle's identity set.
///
/// A known identity absent from the current set is WATCHED iff its silence is
/// older than one minute and younger than ten; everything outside that window
/// is either too fresh to flag or already expired.
pub fn detect_stale(
    known: &[Feature],
    current_ids: &HashSet<String>,
    now: DateTime<Utc>,
) -> Vec<AlertEvent> {
    let mut alerts = Vec::new();

    for feat in known {
        if current_ids.contains(&feat.id) {
            continue;
        }

        let silence = now - feat.properties.time;
        let secs = silence.num_seconds();
        if secs <= WATCH_MIN_SECS || secs >= WATCH_MAX_SECS {
            continue;
        }

        let priority = priority_for(silence);
        let description = format!(
            "{} unreported for {:.1} min, last seen at {:.4}, {:.4}",
            feat.id,
            secs as f64 / 60.0,
            feat.geometry.coordinates.get(1).copied().unwrap_or(f64::NAN),
            feat.geometry.coordinates.first().copied().unwrap_or(f64::NAN),
        );

        alerts.push(AlertEvent {
            id: feat.id.clone(),
            silence,
            priority,
            description,
            feature: alert_feature(feat, now),
        });
    }

    alerts
}

/// Hostile-marked clone of a feature that stopped reporting.
///
/// The affiliation token of the type code flips to hostile, timestamps reset
/// to now with a fixed 4 hour TTL, remarks are replaced with the unreported
/// notice, and any icon override is dropped so the hostile marker renders
/// with the default symbol.
pub fn alert_feature(feat: &Feature, now: DateTime<Utc>) -> Feature {
    let mut out = feat.clone();
    out.properties.cot_type = hostile_type(&feat.properties.cot_type);
    out.properties.remarks = format!("unreported since {}", feat.properties.time.to_rfc3339());
    out.properties.time = now;
    out.properties.start = now;
    out.properties.stale = Some(now + Duration::hours(ALERT_STALE_HOURS));
    out.properties.icon = None;
    out
}

/// Replace the affiliation token of a CoT type code with hostile.
fn hostile_type(cot_type: &str) -> String {
    let mut parts: Vec<&str> = cot_type.split('-').collect();
    if parts.len() < 2 {
        return cot_type.to_string();
    }
    parts[1] = "h";
    parts.join("-")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
