//! Async ingestion worker.
//!
//! File decoding runs on a blocking-capable tokio task that forwards record
//! batches plus progress figures over a bounded `mpsc` channel; the
//! orchestrating side accumulates the batches before invoking the
//! synchronous pipeline. The worker owns the file handle, the consumer owns
//! the accumulator, and nothing is shared in between.

use std::path::PathBuf;

use claims_core::error::{ClaimsError, Result};
use claims_core::models::RawClaim;
use claims_data::reader;
use tokio::sync::mpsc;
use tracing::debug;

/// Default number of records per streamed batch.
pub const DEFAULT_BATCH_SIZE: usize = reader::DEFAULT_BATCH_SIZE;

/// Messages emitted by the ingestion worker, in stream order.
#[derive(Debug, Clone)]
pub enum IngestEvent {
    /// A decoded batch of raw records, in file order.
    Batch(Vec<RawClaim>),
    /// Percentage of the file decoded so far; capped at 99.0 until the
    /// final 100.0.
    Progress(f64),
    /// All records were delivered.
    Finished,
    /// Decoding failed; the payload is the human-readable reason. Terminal:
    /// no partial dataset survives.
    Failed(String),
}

/// Spawns the file-decoding task and exposes its event stream.
pub struct IngestWorker {
    batch_size: usize,
}

impl IngestWorker {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Start decoding `path` on a blocking worker thread.
    ///
    /// The returned receiver yields batches and progress while decoding is
    /// in flight and always terminates with either `Finished` or `Failed`.
    pub fn start(self, path: PathBuf) -> mpsc::Receiver<IngestEvent> {
        // Buffer a handful of batches so a slow consumer does not stall the
        // decoder immediately.
        let (tx, rx) = mpsc::channel(16);

        tokio::task::spawn_blocking(move || {
            let batch_tx = tx.clone();
            let outcome = reader::stream_claims_file(&path, self.batch_size, |batch, progress| {
                if !batch.is_empty() {
                    let _ = batch_tx.blocking_send(IngestEvent::Batch(batch));
                }
                let _ = batch_tx.blocking_send(IngestEvent::Progress(progress));
            });

            let last = match outcome {
                Ok(0) => IngestEvent::Failed(ClaimsError::EmptyDataset.to_string()),
                Ok(count) => {
                    debug!(records = count, path = %path.display(), "ingestion complete");
                    IngestEvent::Finished
                }
                Err(e) => IngestEvent::Failed(e.to_string()),
            };
            let _ = tx.blocking_send(last);
        });

        rx
    }
}

/// Drain an ingestion event stream into the full record set.
///
/// Progress messages are logged and discarded; a `Failed` event becomes a
/// terminal [`ClaimsError::Ingest`].
pub async fn collect(mut rx: mpsc::Receiver<IngestEvent>) -> Result<Vec<RawClaim>> {
    let mut records = Vec::new();
    while let Some(event) = rx.recv().await {
        match event {
            IngestEvent::Batch(batch) => records.extend(batch),
            IngestEvent::Progress(value) => debug!(progress = value, "ingest progress"),
            IngestEvent::Finished => return Ok(records),
            IngestEvent::Failed(reason) => return Err(ClaimsError::Ingest(reason)),
        }
    }
    Err(ClaimsError::Ingest(
        "ingestion channel closed before completion".to_string(),
    ))
}

/// Ingest a file end to end: spawn the worker and accumulate its output.
pub async fn ingest_file(path: PathBuf, batch_size: usize) -> Result<Vec<RawClaim>> {
    collect(IngestWorker::new(batch_size).start(path)).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
