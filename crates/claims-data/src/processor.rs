//! Classification pipeline and status partitioner.

use std::time::Instant;

use claims_core::classify::classify_record;
use claims_core::models::{ProcessedData, RawClaim, StatusBucket};
use tracing::debug;

/// Classify every raw record and partition the result by status.
///
/// Order is preserved in `all` and within each subset. Records land in
/// exactly one of the three subsets according to their status; `Unmapped`
/// records appear only in `all`.
pub fn process_claims(raw: Vec<RawClaim>) -> ProcessedData {
    let started = Instant::now();

    let all: Vec<_> = raw.into_iter().map(classify_record).collect();

    let mut intimation = Vec::new();
    let mut registered = Vec::new();
    let mut under_process = Vec::new();
    for record in &all {
        match record.status {
            StatusBucket::IntimationPending => intimation.push(record.clone()),
            StatusBucket::RegisteredWithProvider => registered.push(record.clone()),
            StatusBucket::UnderProcess => under_process.push(record.clone()),
            StatusBucket::Unmapped => {}
        }
    }

    debug!(
        total = all.len(),
        intimation = intimation.len(),
        registered = registered.len(),
        under_process = under_process.len(),
        unmapped = all.len() - intimation.len() - registered.len() - under_process.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "claims classified"
    );

    ProcessedData {
        all,
        intimation,
        registered,
        under_process,
    }
}
