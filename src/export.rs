//! Batch export entry points.
//!
//! [`export_documents`] is the primary API: it validates the
//! configuration, starts the worker pool, runs the admission-control loop
//! to completion, and returns a [`BatchReport`] — `Ok` even when some
//! pages failed (check `report.failed`). `Err` is reserved for batches
//! that could not start at all.

use crate::batch::{BatchReport, DocumentSpec};
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::extract::ExtractorFactory;
use crate::pool::WorkerPool;
use crate::scheduler::Scheduler;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Convert every page of every document in the batch.
///
/// # Arguments
/// * `docs` — document identities plus page counts, in the order that
///   admission fairness should respect (earlier documents are favoured
///   when capacity is contended)
/// * `factory` — builds one extractor per worker
/// * `config` — scheduling configuration
///
/// # Returns
/// `Ok(BatchReport)` once the batch drains, even if some or all pages
/// failed. An empty batch returns an all-zero report.
///
/// # Errors
/// Returns `Err(ExportError)` only when the batch could not start:
/// invalid caps, or the extractor factory failed while the pool was being
/// built.
pub async fn export_documents(
    docs: Vec<DocumentSpec>,
    factory: Arc<dyn ExtractorFactory>,
    config: &ExportConfig,
) -> Result<BatchReport, ExportError> {
    validate(config)?;

    let start = Instant::now();
    let documents = docs.len();
    let total_pages: usize = docs.iter().map(|d| d.num_pages).sum();

    info!(
        max_workers = config.max_workers,
        max_outstanding = config.max_outstanding,
        per_document_cap = config.per_document_cap,
        documents,
        total_pages,
        "starting batch export"
    );

    if let Some(cb) = &config.progress {
        cb.on_batch_start(total_pages);
    }

    let pool = WorkerPool::start(&factory, config.max_workers)?;
    let summary = Scheduler::new(docs, config).run(&pool).await;
    pool.shutdown().await;

    let elapsed = start.elapsed();
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        cancelled = summary.cancelled,
        elapsed_ms = elapsed.as_millis() as u64,
        "batch export finished"
    );

    if let Some(cb) = &config.progress {
        cb.on_batch_complete(total_pages, summary.succeeded);
    }

    Ok(BatchReport {
        documents,
        total_pages,
        succeeded: summary.succeeded,
        failed: summary.failed,
        skipped: summary.skipped,
        cancelled: summary.cancelled,
        elapsed,
        outcomes: summary.outcomes,
    })
}

/// Synchronous wrapper around [`export_documents`].
///
/// Creates a temporary tokio runtime internally.
pub fn export_documents_sync(
    docs: Vec<DocumentSpec>,
    factory: Arc<dyn ExtractorFactory>,
    config: &ExportConfig,
) -> Result<BatchReport, ExportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExportError::Runtime(e.to_string()))?
        .block_on(export_documents(docs, factory, config))
}

/// Reject configurations the builder could not have produced.
///
/// `ExportConfig` fields are public, so a hand-assembled config can carry
/// a zero cap — which would wedge admission forever rather than fail.
fn validate(config: &ExportConfig) -> Result<(), ExportError> {
    if config.max_workers == 0 {
        return Err(ExportError::InvalidConfig("max_workers must be ≥ 1".into()));
    }
    if config.max_outstanding == 0 {
        return Err(ExportError::InvalidConfig(
            "max_outstanding must be ≥ 1".into(),
        ));
    }
    if config.per_document_cap == 0 {
        return Err(ExportError::InvalidConfig(
            "per_document_cap must be ≥ 1".into(),
        ));
    }
    Ok(())
}
