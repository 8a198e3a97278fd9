//! cot-core: Pure transform + alerting library for the ADS-B → CoT pipeline.
//!
//! No async, no I/O — just the decision logic: symbology classification,
//! include-rule join, feature assembly, output filtering, and loss-of-contact
//! detection. This crate is the shared core used by the `cot-etl` job binary.

pub mod classify;
pub mod config;
pub mod feature;
pub mod filter;
pub mod icons;
pub mod include;
pub mod staleness;
pub mod types;

// Re-export commonly used types at crate root
pub use classify::{classify, HexRange};
pub use config::TaskConfig;
pub use feature::{build_feature_set, BuildOptions};
pub use filter::filter_features;
pub use include::{IncludeIndex, IncludeRule};
pub use staleness::{detect_stale, AlertEvent, AlertNotification, AlertPriority};
pub use types::*;
