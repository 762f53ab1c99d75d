//! # mdexport
//!
//! Batch-convert multi-page documents to per-page Markdown artifacts with a
//! bounded, fairness-aware worker pool.
//!
//! ## Why this crate?
//!
//! Converting a large document set page-by-page is embarrassingly parallel,
//! but naive fan-out has two failure modes: submitting every page of every
//! document at once exhausts memory before the first worker drains the queue,
//! and letting one thousand-page document monopolise the pool starves every
//! small document behind it. This crate schedules page-level units of work
//! under two simultaneous caps — a global outstanding cap (backpressure) and
//! a per-document cap (fairness) — and keeps the pool saturated by refilling
//! as completions drain.
//!
//! ## Pipeline Overview
//!
//! ```text
//! [DocumentSpec, ...]
//!  │
//!  ├─ 1. Admit    scan documents in fixed order, top up to the caps
//!  ├─ 2. Dispatch hand each UnitOfWork to a blocking worker slot
//!  ├─ 3. Extract  one PageExtractor per worker converts the page
//!  ├─ 4. Drain    await the first completion, absorb all ready outcomes
//!  └─ 5. Report   aggregate counts + per-unit outcomes
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdexport::{export_documents, DocumentSpec, ExportConfig, ExtractorFactory};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let docs = vec![DocumentSpec::new("reports/q3.pdf", 42)];
//!     let config = ExportConfig::builder()
//!         .max_workers(4)
//!         .per_document_cap(2)
//!         .build()?;
//!     # let factory: Arc<dyn ExtractorFactory> = unimplemented!();
//!     let report = export_documents(docs, factory, &config).await?;
//!     eprintln!("{} ok / {} err in {:?}",
//!         report.succeeded, report.failed, report.elapsed);
//!     Ok(())
//! }
//! ```
//!
//! Page extraction itself is an external capability: implement
//! [`PageExtractor`] (and an [`ExtractorFactory`] that builds one instance
//! per worker) around whatever conversion backend you use. The scheduler
//! assumes the backend is not reentrant and never shares an extractor
//! between workers.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod pool;
pub mod progress;
mod scheduler;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{page_destination, BatchReport, DocumentSpec, UnitOfWork, UnitOutcome};
pub use config::{ExportConfig, ExportConfigBuilder, ExtractOptions};
pub use error::{ExportError, UnitError};
pub use export::{export_documents, export_documents_sync};
pub use extract::{BoxError, Extraction, ExtractorFactory, PageExtractor};
pub use progress::{ExportProgressCallback, NoopProgressCallback, ProgressCallback};
