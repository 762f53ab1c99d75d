//! Error types for the mdexport library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExportError`] — **Fatal**: the batch cannot run at all (invalid
//!   configuration, the worker pool could not be constructed). Returned as
//!   `Err(ExportError)` from the top-level `export_documents*` functions.
//!
//! * [`UnitError`] — **Non-fatal**: a single page failed (extractor error,
//!   empty output, worker crash) while every other page is unaffected.
//!   Stored inside [`crate::batch::UnitOutcome::Failure`] so callers can
//!   inspect partial success rather than losing the whole batch to one bad
//!   page.
//!
//! The scheduler's loop has no fatal path for per-page problems: every
//! per-unit error is contained at the unit boundary and folded into the
//! final [`crate::batch::BatchReport`]. The caller can always distinguish
//! "batch completed with N failures" from "batch could not start".

use thiserror::Error;

/// All fatal errors returned by the mdexport library.
///
/// Page-level failures use [`UnitError`] and are stored in
/// [`crate::batch::UnitOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The worker pool could not be constructed, so the batch never ran
    /// and no partial results exist.
    #[error("Worker pool failed to start: {detail}")]
    PoolStart { detail: String },

    /// The synchronous wrapper could not create a tokio runtime.
    #[error("Failed to create tokio runtime: {0}")]
    Runtime(String),
}

/// A non-fatal error for a single unit of work.
///
/// Produced exactly once per failed unit and carried inside
/// [`crate::batch::UnitOutcome::Failure`] together with the document
/// identity and page number, so bookkeeping stays consistent no matter
/// where the failure originated.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum UnitError {
    /// The extractor returned an error for this page.
    #[error("extraction failed: {detail}")]
    Extraction { detail: String },

    /// The extractor completed without raising but produced no output.
    #[error("no output produced")]
    EmptyOutput,

    /// The pool could not accept the unit at submit time. The page is
    /// marked failed and skipped, never retried.
    #[error("submission failed: {detail}")]
    Submission { detail: String },

    /// The worker executing the unit terminated abnormally. Surfaced in
    /// the same shape as an extraction failure, never silently lost.
    #[error("worker crashed: {detail}")]
    WorkerCrashed { detail: String },
}
