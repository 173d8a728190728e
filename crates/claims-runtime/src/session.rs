//! Per-session dashboard state.
//!
//! Owns one loaded dataset plus the active filter set. Every filter change
//! re-runs aggregation over the filtered subset and replaces the filtered
//! outputs wholesale; last write wins and consumers only ever observe
//! complete snapshots. Dropping the session is the reset.

use std::path::PathBuf;

use claims_core::error::Result;
use claims_core::models::{Category, ClaimRecord, KpiData, PivotDict, ProcessedData};
use claims_data::analysis::{analyze_claims, AnalysisMetadata, DashboardBundle};
use claims_data::filter::FilterState;
use claims_data::{kpi, pivot};
use tracing::debug;

use crate::ingest;

/// One loaded dataset and its derived dashboard views.
pub struct DashboardSession {
    bundle: DashboardBundle,
    filters: FilterState,
    filtered: Vec<ClaimRecord>,
    filtered_pivots: PivotDict,
    filtered_kpis: KpiData,
}

impl DashboardSession {
    /// Ingest `path` through the background worker and run the pipeline.
    pub async fn load(path: PathBuf, batch_size: usize) -> Result<Self> {
        let raw = ingest::ingest_file(path, batch_size).await?;
        let bundle = analyze_claims(raw);
        Ok(Self {
            filters: FilterState::default(),
            filtered: bundle.data.registered.clone(),
            filtered_pivots: bundle.pivots.clone(),
            filtered_kpis: bundle.kpis.clone(),
            bundle,
        })
    }

    /// Replace the active filters and rebuild the filtered view.
    ///
    /// Aggregation re-runs synchronously on every call; each run fully
    /// supersedes the previous filtered outputs.
    pub fn set_filters(&mut self, filters: FilterState) {
        self.filtered = filters.apply(&self.bundle.data.registered);
        self.filtered_pivots = pivot::build_pivot_dict(&self.filtered);
        self.filtered_kpis = kpi::summarize(&self.filtered);
        debug!(
            selected = self.filtered.len(),
            of = self.bundle.data.registered.len(),
            "filters applied"
        );
        self.filters = filters;
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The partitioned record set.
    pub fn data(&self) -> &ProcessedData {
        &self.bundle.data
    }

    /// Pivot tables over the unfiltered Registered subset.
    pub fn base_pivots(&self) -> &PivotDict {
        &self.bundle.pivots
    }

    /// KPI snapshot over the unfiltered Registered subset.
    pub fn base_kpis(&self) -> &KpiData {
        &self.bundle.kpis
    }

    /// The currently active filters.
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// The filtered Registered subset.
    pub fn filtered_records(&self) -> &[ClaimRecord] {
        &self.filtered
    }

    /// Pivot tables over the filtered subset. Equal to [`Self::base_pivots`]
    /// while the filter set is empty.
    pub fn pivots(&self) -> &PivotDict {
        &self.filtered_pivots
    }

    /// KPI snapshot over the filtered subset.
    pub fn kpis(&self) -> &KpiData {
        &self.filtered_kpis
    }

    /// Distinct values per filterable category.
    pub fn filter_options(&self) -> &[(Category, Vec<String>)] {
        &self.bundle.filter_options
    }

    pub fn metadata(&self) -> &AnalysisMetadata {
        &self.bundle.metadata
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
