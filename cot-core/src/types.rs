//! Shared types, error enum, and wire structures for cot-core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// All errors produced by the pipeline.
#[derive(Debug, Error)]
pub enum CotError {
    #[error("config error: {0}")]
    Config(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("unexpected provider response: {0}")]
    Response(String),
    #[error("submit failed: {0}")]
    Submit(String),
    #[error("notify failed: {0}")]
    Notify(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CotError>;

// ---------------------------------------------------------------------------
// Unit conversions and sentinels
// ---------------------------------------------------------------------------

/// 1 knot in meters per second.
pub const KNOTS_TO_MPS: f64 = 0.514_444_4;

/// 1 foot in meters.
pub const FEET_TO_METERS: f64 = 0.3048;

/// CoT renders unknown speed/course as NaN. Unknown is not zero.
pub const UNKNOWN_SPEED: f64 = f64::NAN;
pub const UNKNOWN_COURSE: f64 = f64::NAN;

// ---------------------------------------------------------------------------
// Identity helpers
// ---------------------------------------------------------------------------

/// Lower-cased, trimmed key used for identities and rule lookups.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Feature identity: registration if non-empty, else callsign, normalized.
///
/// Returns `None` when neither field yields a non-empty identity; such
/// records produce no feature.
pub fn feature_id(registration: Option<&str>, flight: Option<&str>) -> Option<String> {
    let raw = registration
        .filter(|r| !r.trim().is_empty())
        .or(flight)?;
    let id = normalize_key(raw);
    if id.is_empty() {
        return None;
    }
    Some(id)
}

// ---------------------------------------------------------------------------
// Provider record
// ---------------------------------------------------------------------------

/// Altitude as reported by the provider: feet, or a string such as "ground".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AltValue {
    Feet(f64),
    Text(String),
}

impl AltValue {
    /// Finite altitude in feet, if the value carries one.
    pub fn as_feet(&self) -> Option<f64> {
        let v = match self {
            AltValue::Feet(v) => *v,
            AltValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }

    /// Human-readable form for the remarks block.
    pub fn display(&self) -> String {
        match self {
            AltValue::Feet(v) => format!("{v} ft"),
            AltValue::Text(s) => s.trim().to_string(),
        }
    }
}

/// One aircraft from an ADSBExchange v2 snapshot.
///
/// Field names follow the provider wire format via serde renames. The
/// `group`/`cot_type`/`comments` fields are never sent by the provider;
/// the include join fills them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AircraftRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    /// ADS-B data source type, e.g. "adsb_icao" or "adsb_icao_nt".
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight: Option<String>,
    #[serde(rename = "r", skip_serializing_if = "Option::is_none")]
    pub registration: Option<String>,
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub airframe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Database flag bitmask; bit 0 = military.
    #[serde(rename = "dbFlags", skip_serializing_if = "Option::is_none")]
    pub db_flags: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_baro: Option<AltValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_geom: Option<AltValue>,
    /// Ground speed in knots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gs: Option<f64>,
    /// Track angle in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squawk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// Seconds since the position was last reported.
    #[serde(default)]
    pub seen_pos: f64,
    /// Seconds since any message was received.
    #[serde(default)]
    pub seen: f64,

    // Populated by the include join, not by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cot_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

// ---------------------------------------------------------------------------
// Output features
// ---------------------------------------------------------------------------

/// GeoJSON feature collection submitted to the sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        FeatureCollection {
            kind: "FeatureCollection".into(),
            features,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// One normalized aircraft feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: FeatureProperties,
    pub geometry: PointGeometry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureProperties {
    /// CoT symbology type code, e.g. "a-f-A-C-F".
    #[serde(rename = "type")]
    pub cot_type: String,
    pub callsign: String,
    pub time: DateTime<Utc>,
    pub start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale: Option<DateTime<Utc>>,
    /// Speed in m/s; NaN (null on the wire) when unknown.
    #[serde(default = "unknown_f64", deserialize_with = "nan_when_null")]
    pub speed: f64,
    /// Course in degrees; NaN (null on the wire) when unknown.
    #[serde(default = "unknown_f64", deserialize_with = "nan_when_null")]
    pub course: f64,
    pub remarks: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<AlertDetail>,
    pub metadata: AircraftRecord,
}

/// Alert emphasis block attached to emergency aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDetail {
    pub alert: String,
}

impl AlertDetail {
    pub fn red() -> Self {
        AlertDetail {
            alert: "red".into(),
        }
    }
}

/// Point geometry; coordinates are `[lon, lat]` plus altitude in meters
/// when a finite geometric altitude was reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

impl PointGeometry {
    pub fn new(coordinates: Vec<f64>) -> Self {
        PointGeometry {
            kind: "Point".into(),
            coordinates,
        }
    }
}

fn unknown_f64() -> f64 {
    f64::NAN
}

/// JSON serializers emit NaN as null; map null back to the NaN sentinel.
fn nan_when_null<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
