//! Task configuration — operator-supplied settings for one scheduled job.
//!
//! Loading (file/env) lives in the binary; this module owns the structure,
//! defaults, and the fatal-error validation that runs before any network
//! access.

use serde::{Deserialize, Serialize};

use crate::classify::HexRange;
use crate::include::IncludeRule;
use crate::types::{CotError, Result};

/// Default ADSBExchange endpoint.
pub const DEFAULT_API_URL: &str = "https://adsbexchange.com/api/aircraft";

/// Full job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Query center as "lat,lon".
    pub center: String,
    /// Query radius in nautical miles.
    pub dist_nm: f64,
    pub api_url: String,
    /// ADSBExchange API token. Required.
    pub token: String,
    /// Feature sink endpoint: POST submits, GET returns the known state.
    pub sink_url: String,
    /// Webhook for discrete alert notifications.
    pub webhook_url: Option<String>,
    /// Restrict output to aircraft matched by an include rule.
    pub filtering: bool,
    /// Resolve icons from include-rule groups.
    pub use_icons: bool,
    pub includes: Vec<IncludeRule>,
    /// Highlight aircraft in emergency status with a red alert detail.
    pub emergency_alert: bool,
    /// Skip tower and ground-vehicle transponders.
    pub ignore_ground_vehicles: bool,
    /// Domestic ICAO hex range, e.g. C80000-C87FFF for New Zealand.
    pub hex_domestic_start: String,
    pub hex_domestic_end: String,
    /// Emit loss-of-contact alerts against the known state.
    pub stale_alerts: bool,
    /// Log raw provider payloads.
    pub debug: bool,
}

impl Default for TaskConfig {
    fn default() -> Self {
        TaskConfig {
            center: "-41.29,174.78".into(),
            dist_nm: 750.0,
            api_url: DEFAULT_API_URL.into(),
            token: String::new(),
            sink_url: String::new(),
            webhook_url: None,
            filtering: false,
            use_icons: true,
            includes: Vec::new(),
            emergency_alert: true,
            ignore_ground_vehicles: true,
            hex_domestic_start: "C80000".into(),
            hex_domestic_end: "C87FFF".into(),
            stale_alerts: false,
            debug: false,
        }
    }
}

impl TaskConfig {
    /// Fatal-error check, run before any network access.
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(CotError::Config("ADSBX API token is required".into()));
        }
        if self.sink_url.trim().is_empty() {
            return Err(CotError::Config("sink_url is required".into()));
        }
        self.center()?;
        self.domestic_range()?;
        Ok(())
    }

    /// Parsed query center.
    pub fn center(&self) -> Result<(f64, f64)> {
        let (lat, lon) = self
            .center
            .split_once(',')
            .ok_or_else(|| CotError::Config(format!("center must be \"lat,lon\": {:?}", self.center)))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| CotError::Config(format!("center must be \"lat,lon\": {:?}", self.center)))
        };
        Ok((parse(lat)?, parse(lon)?))
    }

    /// Parsed domestic hex range.
    pub fn domestic_range(&self) -> Result<HexRange> {
        HexRange::parse(&self.hex_domestic_start, &self.hex_domestic_end)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
