//! ADSBExchange v2 snapshot client.
//!
//! Fetches the aircraft list around a query center. Response parsing is
//! deliberately loose: the envelope must carry an `ac` array, but a record
//! that fails to deserialize is skipped rather than failing the snapshot.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::debug;

use cot_core::types::{AircraftRecord, CotError, Result};

pub struct AdsbxClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl AdsbxClient {
    pub fn new(api_url: &str, token: &str) -> Self {
        AdsbxClient {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Snapshot URL for a center point and radius in nautical miles.
    pub fn query_url(&self, lat: f64, lon: f64, dist_nm: f64) -> String {
        format!("{}/v2/lat/{lat}/lon/{lon}/dist/{dist_nm}/", self.api_url)
    }

    /// Fetch one snapshot.
    pub async fn fetch(&self, lat: f64, lon: f64, dist_nm: f64) -> Result<Vec<AircraftRecord>> {
        let cache_buster = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
            .to_string();

        let response = self
            .client
            .get(self.query_url(lat, lon, dist_nm))
            .query(&[("apiKey", self.token.as_str()), ("cacheBuster", &cache_buster)])
            .header("x-rapidapi-key", &self.token)
            .header("api-auth", &self.token)
            .send()
            .await
            .map_err(|e| CotError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CotError::Fetch(format!(
                "ADSBX API returned status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CotError::Response(e.to_string()))?;

        parse_snapshot(&body)
    }
}

/// Pull the aircraft list out of a provider response body.
pub fn parse_snapshot(body: &Value) -> Result<Vec<AircraftRecord>> {
    let ac = body
        .get("ac")
        .and_then(Value::as_array)
        .ok_or_else(|| CotError::Response("missing aircraft data".into()))?;

    let mut records = Vec::with_capacity(ac.len());
    let mut skipped = 0usize;
    for raw in ac {
        match serde_json::from_value::<AircraftRecord>(raw.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                debug!("skipping malformed aircraft record: {e}");
            }
        }
    }
    if skipped > 0 {
        debug!("skipped {skipped} malformed aircraft records");
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
