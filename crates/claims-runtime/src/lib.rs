//! Runtime orchestration layer for Claims Insight.
//!
//! Offloads file decoding to a background ingestion worker so the
//! interactive surface stays responsive, and holds the per-session dashboard
//! state that re-runs aggregation whenever the filters change.

pub mod ingest;
pub mod session;

pub use claims_core as core;
pub use claims_data as data;
