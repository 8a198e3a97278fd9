//! Collaborator interface for one job cycle.
//!
//! The core has no need of a host-runtime base class; everything the cycle
//! touches over the network sits behind this trait: the provider fetch, the
//! feature sink, the known-state query, and alert notifications.

use async_trait::async_trait;
use tracing::info;

use cot_core::staleness::AlertNotification;
use cot_core::types::{AircraftRecord, CotError, Feature, FeatureCollection, Result};
use cot_core::TaskConfig;

use crate::adsbx::AdsbxClient;

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Retrieve the current raw snapshot.
    async fn fetch(&self) -> Result<Vec<AircraftRecord>>;
    /// Submit a feature collection to the sink.
    async fn submit(&self, fc: &FeatureCollection) -> Result<()>;
    /// Read back the previously submitted feature collection.
    async fn query_known_state(&self) -> Result<Vec<Feature>>;
    /// Deliver one discrete alert notification.
    async fn notify(&self, note: &AlertNotification) -> Result<()>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

pub struct HttpGateway {
    adsbx: AdsbxClient,
    client: reqwest::Client,
    lat: f64,
    lon: f64,
    dist_nm: f64,
    sink_url: String,
    webhook_url: Option<String>,
}

impl HttpGateway {
    pub fn new(cfg: &TaskConfig) -> Result<Self> {
        let (lat, lon) = cfg.center()?;
        Ok(HttpGateway {
            adsbx: AdsbxClient::new(&cfg.api_url, &cfg.token),
            client: reqwest::Client::new(),
            lat,
            lon,
            dist_nm: cfg.dist_nm,
            sink_url: cfg.sink_url.clone(),
            webhook_url: cfg.webhook_url.clone(),
        })
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch(&self) -> Result<Vec<AircraftRecord>> {
        self.adsbx.fetch(self.lat, self.lon, self.dist_nm).await
    }

    async fn submit(&self, fc: &FeatureCollection) -> Result<()> {
        let response = self
            .client
            .post(&self.sink_url)
            .json(fc)
            .send()
            .await
            .map_err(|e| CotError::Submit(e.to_string()))?;
        if !response.status().is_success() {
            return Err(CotError::Submit(format!(
                "sink returned status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn query_known_state(&self) -> Result<Vec<Feature>> {
        let response = self
            .client
            .get(&self.sink_url)
            .send()
            .await
            .map_err(|e| CotError::Fetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(CotError::Fetch(format!(
                "known-state query returned status {}",
                response.status()
            )));
        }
        let fc: FeatureCollection = response
            .json()
            .await
            .map_err(|e| CotError::Response(e.to_string()))?;
        Ok(fc.features)
    }

    async fn notify(&self, note: &AlertNotification) -> Result<()> {
        let url = match &self.webhook_url {
            Some(u) => u,
            None => return Ok(()), // No webhook configured — drop silently
        };
        let response = self
            .client
            .post(url)
            .json(note)
            .send()
            .await
            .map_err(|e| CotError::Notify(e.to_string()))?;
        if !response.status().is_success() {
            return Err(CotError::Notify(format!(
                "webhook returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dry-run wrapper
// ---------------------------------------------------------------------------

/// Fetches live but logs payloads instead of delivering them.
pub struct DryRunGateway {
    inner: HttpGateway,
}

impl DryRunGateway {
    pub fn new(inner: HttpGateway) -> Self {
        DryRunGateway { inner }
    }
}

#[async_trait]
impl Gateway for DryRunGateway {
    async fn fetch(&self) -> Result<Vec<AircraftRecord>> {
        self.inner.fetch().await
    }

    async fn submit(&self, fc: &FeatureCollection) -> Result<()> {
        info!(
            "dry run - would submit {} features:\n{}",
            fc.features.len(),
            serde_json::to_string_pretty(fc).unwrap_or_default()
        );
        Ok(())
    }

    async fn query_known_state(&self) -> Result<Vec<Feature>> {
        self.inner.query_known_state().await
    }

    async fn notify(&self, note: &AlertNotification) -> Result<()> {
        info!(
            "dry run - would notify: {}",
            serde_json::to_string(note).unwrap_or_default()
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
