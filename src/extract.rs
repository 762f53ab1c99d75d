//! The extractor boundary: the opaque capability that turns one page into
//! a Markdown artifact.
//!
//! ## Why a synchronous trait?
//!
//! Document-conversion backends are CPU-bound C/C++ wrappers that are not
//! async-safe, and many are not reentrant either. Units therefore execute
//! on dedicated blocking worker threads, one extractor instance per worker
//! lifetime, never shared and never re-created per call. The trait takes
//! `&mut self` to make that exclusivity explicit in the signature.
//!
//! The extractor is also responsible for writing the artifact to
//! `unit.destination` — persistence details (encoding, headers, temp-file
//! strategies) stay behind this boundary, and the scheduler only learns
//! where the artifact landed and how big it was.

use crate::batch::UnitOfWork;
use std::path::PathBuf;

/// Boxed error for extractor implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What the extractor reports after writing one page's artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Where the artifact was written. Normally `unit.destination`.
    pub destination: PathBuf,
    /// Size of the extracted text in bytes.
    pub bytes: usize,
}

/// Converts one page of one document into a Markdown artifact.
///
/// Invoked once per unit of work, always from the worker thread that owns
/// this instance. Implementations must not share mutable state with other
/// extractor instances.
///
/// # Return contract
///
/// * `Ok(Some(extraction))` — the page converted and its artifact was
///   written to `extraction.destination`.
/// * `Ok(None)` — the backend completed without raising but produced no
///   output; the scheduler records this as a failure with detail
///   "no output produced".
/// * `Err(e)` — the page failed; the error detail is recorded and the
///   batch continues.
///
/// Implementations should catch backend exceptions internally and return
/// `Err` rather than panicking; a panic is contained by the pool and
/// surfaced as [`crate::error::UnitError::WorkerCrashed`], but with less
/// useful detail than a proper error.
pub trait PageExtractor: Send {
    fn extract(&mut self, unit: &UnitOfWork) -> Result<Option<Extraction>, BoxError>;
}

/// Builds one [`PageExtractor`] per worker lifetime.
///
/// Called `max_workers` times while the pool starts; a failure here aborts
/// the whole batch before any unit is submitted ("batch could not start").
pub trait ExtractorFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn PageExtractor>, BoxError>;
}
