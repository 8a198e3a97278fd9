//! One scheduled job cycle: fetch → classify/join/build → filter → submit,
//! then staleness detection against the known state.
//!
//! Each cycle is independent and idempotent — recomputed fully from the
//! current snapshot plus the previous known state. A fetch failure submits an
//! empty collection instead of propagating.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use cot_core::feature::{build_feature_set, BuildOptions};
use cot_core::filter::filter_features;
use cot_core::include::IncludeIndex;
use cot_core::staleness::detect_stale;
use cot_core::types::{FeatureCollection, Result};
use cot_core::TaskConfig;

use crate::gateway::Gateway;

/// What one cycle did, for logging and tests.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub submitted: usize,
    pub alerts: usize,
}

pub async fn run_cycle(
    gateway: &dyn Gateway,
    cfg: &TaskConfig,
    now: DateTime<Utc>,
) -> Result<CycleReport> {
    let opts = BuildOptions {
        domestic: cfg.domestic_range()?,
        emergency_alert: cfg.emergency_alert,
        use_icons: cfg.use_icons,
        ignore_ground_vehicles: cfg.ignore_ground_vehicles,
    };

    let records = match gateway.fetch().await {
        Ok(records) => records,
        Err(e) => {
            warn!("fetch failed, submitting empty collection: {e}");
            gateway.submit(&FeatureCollection::empty()).await?;
            return Ok(CycleReport::default());
        }
    };
    if cfg.debug {
        debug!("provider returned {} raw records", records.len());
    }

    let index = IncludeIndex::build(&cfg.includes);
    let features = build_feature_set(&records, &index, &opts, now);
    let fetched = features.len();
    let output = filter_features(features, &index, cfg.filtering);

    info!("ok - fetched {fetched} aircraft, submitting {}", output.len());

    let current_ids: HashSet<String> = output.iter().map(|f| f.id.clone()).collect();
    let submitted = output.len();
    gateway.submit(&FeatureCollection::new(output)).await?;

    let mut alert_count = 0;
    if cfg.stale_alerts {
        let known = match gateway.query_known_state().await {
            Ok(known) => known,
            Err(e) => {
                warn!("known-state query failed, skipping staleness detection: {e}");
                return Ok(CycleReport {
                    fetched,
                    submitted,
                    alerts: 0,
                });
            }
        };

        let alerts = detect_stale(&known, &current_ids, now);
        alert_count = alerts.len();
        if !alerts.is_empty() {
            info!("{alert_count} aircraft unreported, submitting alerts");
            let alert_features = alerts.iter().map(|a| a.feature.clone()).collect();
            gateway
                .submit(&FeatureCollection::new(alert_features))
                .await?;
            for alert in &alerts {
                if let Err(e) = gateway.notify(&alert.notification()).await {
                    warn!("notification failed for {}: {e}", alert.id);
                }
            }
        }
    }

    Ok(CycleReport {
        fetched,
        submitted,
        alerts: alert_count,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    use cot_core::staleness::AlertNotification;
    use cot_core::types::{AircraftRecord, CotError, Feature};

    #[derive(Default)]
    struct MockGateway {
        records: Vec<AircraftRecord>,
        known: Vec<Feature>,
        fail_fetch: bool,
        fail_known: bool,
        submissions: Mutex<Vec<FeatureCollection>>,
        notifications: Mutex<Vec<AlertNotification>>,
    }

    #[async_trait]
    impl Gateway for MockGateway {
        async fn fetch(&self) -> Result<Vec<AircraftRecord>> {
            if self.fail_fetch {
                return Err(CotError::Fetch("boom".into()));
            }
            Ok(self.records.clone())
        }

        async fn submit(&self, fc: &FeatureCollection) -> Result<()> {
            self.submissions.lock().unwrap().push(fc.clone());
            Ok(())
        }

        async fn query_known_state(&self) -> Result<Vec<Feature>> {
            if self.fail_known {
                return Err(CotError::Fetch("boom".into()));
            }
            Ok(self.known.clone())
        }

        async fn notify(&self, note: &AlertNotification) -> Result<()> {
            self.notifications.lock().unwrap().push(note.clone());
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn config() -> TaskConfig {
        TaskConfig {
            token: "secret".into(),
            sink_url: "https://tak.example.com/api/features".into(),
            ..Default::default()
        }
    }

    fn record(hex: &str, reg: &str) -> AircraftRecord {
        AircraftRecord {
            hex: Some(hex.into()),
            registration: Some(reg.into()),
            lat: -41.3,
            lon: 174.8,
            ..Default::default()
        }
    }

    fn known_feature(id: &str, silent_secs: i64) -> Feature {
        use cot_core::types::{FeatureProperties, PointGeometry};
        let seen = now() - Duration::seconds(silent_secs);
        Feature {
            id: id.into(),
            kind: "Feature".into(),
            properties: FeatureProperties {
                cot_type: "a-f-A-C-F".into(),
                callsign: id.to_uppercase(),
                time: seen,
                start: seen,
                stale: None,
                speed: 50.0,
                course: 90.0,
                remarks: String::new(),
                icon: None,
                detail: None,
                metadata: AircraftRecord::default(),
            },
            geometry: PointGeometry::new(vec![174.8, -41.3]),
        }
    }

    #[tokio::test]
    async fn test_normal_cycle_submits_features() {
        let gw = MockGateway {
            records: vec![record("C84A2F", "ZK-OXB"), record("C84A30", "ZK-HXP")],
            ..Default::default()
        };
        let report = run_cycle(&gw, &config(), now()).await.unwrap();
        assert_eq!(report, CycleReport { fetched: 2, submitted: 2, alerts: 0 });

        let subs = gw.submissions.lock().unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].features.len(), 2);
        assert_eq!(subs[0].kind, "FeatureCollection");
    }

    #[tokio::test]
    async fn test_fetch_failure_submits_empty() {
        let gw = MockGateway {
            fail_fetch: true,
            ..Default::default()
        };
        let report = run_cycle(&gw, &config(), now()).await.unwrap();
        assert_eq!(report, CycleReport::default());

        let subs = gw.submissions.lock().unwrap();
        assert_eq!(subs.len(), 1);
        assert!(subs[0].features.is_empty());
    }

    #[tokio::test]
    async fn test_filtering_restricts_output() {
        let mut cfg = config();
        cfg.filtering = true;
        cfg.includes = vec![cot_core::IncludeRule {
            registration: Some("ZK-HXP".into()),
            group: "EMS_ROTOR".into(),
            ..Default::default()
        }];

        let gw = MockGateway {
            records: vec![record("C84A2F", "ZK-OXB"), record("C84A30", "ZK-HXP")],
            ..Default::default()
        };
        let report = run_cycle(&gw, &cfg, now()).await.unwrap();
        assert_eq!(report.fetched, 2);
        assert_eq!(report.submitted, 1);

        let subs = gw.submissions.lock().unwrap();
        assert_eq!(subs[0].features[0].id, "zk-hxp");
    }

    #[tokio::test]
    async fn test_stale_alerts_submitted_and_notified() {
        let mut cfg = config();
        cfg.stale_alerts = true;

        let gw = MockGateway {
            records: vec![record("C84A2F", "ZK-OXB")],
            known: vec![
                known_feature("zk-oxb", 300),  // still reporting
                known_feature("zk-hxp", 300),  // silent 5 min — flagged
                known_feature("zk-old", 4000), // expired
            ],
            ..Default::default()
        };
        let report = run_cycle(&gw, &cfg, now()).await.unwrap();
        assert_eq!(report.alerts, 1);

        let subs = gw.submissions.lock().unwrap();
        assert_eq!(subs.len(), 2); // features, then alert features
        assert_eq!(subs[1].features.len(), 1);
        assert_eq!(subs[1].features[0].id, "zk-hxp");
        assert!(subs[1].features[0].properties.cot_type.starts_with("a-h-"));

        let notes = gw.notifications.lock().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Loss of contact: ZK-HXP");
    }

    #[tokio::test]
    async fn test_no_alert_submission_when_nothing_stale() {
        let mut cfg = config();
        cfg.stale_alerts = true;

        let gw = MockGateway {
            records: vec![record("C84A2F", "ZK-OXB")],
            known: vec![known_feature("zk-oxb", 300)],
            ..Default::default()
        };
        let report = run_cycle(&gw, &cfg, now()).await.unwrap();
        assert_eq!(report.alerts, 0);
        assert_eq!(gw.submissions.lock().unwrap().len(), 1);
        assert!(gw.notifications.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_known_state_failure_skips_staleness() {
        let mut cfg = config();
        cfg.stale_alerts = true;

        let gw = MockGateway {
            records: vec![record("C84A2F", "ZK-OXB")],
            fail_known: true,
            ..Default::default()
        };
        let report = run_cycle(&gw, &cfg, now()).await.unwrap();
        assert_eq!(report.submitted, 1);
        assert_eq!(report.alerts, 0);
        assert_eq!(gw.submissions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_alerts_disabled_never_queries() {
        let gw = MockGateway {
            records: vec![record("C84A2F", "ZK-OXB")],
            known: vec![known_feature("zk-hxp", 300)],
            ..Default::default()
        };
        let report = run_cycle(&gw, &config(), now()).await.unwrap();
        assert_eq!(report.alerts, 0);
        assert_eq!(gw.submissions.lock().unwrap().len(), 1);
    }
}
