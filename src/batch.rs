//! Batch data model: documents, units of work, outcomes, and the report.
//!
//! A *unit of work* is the smallest schedulable task — converting one page
//! of one document. The scheduler creates units, the pool executes them,
//! and exactly one [`UnitOutcome`] comes back per unit. Nothing in this
//! module is mutated concurrently; all bookkeeping lives in the scheduler.

use crate::config::ExtractOptions;
use crate::error::UnitError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One input document: a stable path identity plus its page count.
///
/// Page counts come from the caller (document discovery is a separate
/// concern); a zero-page document is legal and simply yields no units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSpec {
    /// Stable identity of the document. Also the source path handed to
    /// the extractor.
    pub path: PathBuf,
    /// Total number of pages, immutable once discovered.
    pub num_pages: usize,
}

impl DocumentSpec {
    pub fn new(path: impl Into<PathBuf>, num_pages: usize) -> Self {
        Self {
            path: path.into(),
            num_pages,
        }
    }
}

/// "Page N of document D": created and owned by the scheduler until handed
/// to the pool, executed by exactly one worker, answered by exactly one
/// [`UnitOutcome`]. Immutable once created.
#[derive(Debug, Clone)]
pub struct UnitOfWork {
    /// Document identity.
    pub doc: PathBuf,
    /// 1-based page number.
    pub page: usize,
    /// Where the extracted artifact must be written. Derived
    /// deterministically from `(doc, page)` — see [`page_destination`].
    pub destination: PathBuf,
    /// Opaque options passed through to the extractor.
    pub options: ExtractOptions,
}

/// The tagged result of one unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UnitOutcome {
    /// The page was extracted and its artifact written.
    Success {
        doc: PathBuf,
        page: usize,
        destination: PathBuf,
        elapsed: Duration,
    },
    /// The page failed; the batch continues.
    Failure {
        doc: PathBuf,
        page: usize,
        error: UnitError,
    },
}

impl UnitOutcome {
    /// Document identity this outcome belongs to.
    pub fn doc(&self) -> &Path {
        match self {
            UnitOutcome::Success { doc, .. } | UnitOutcome::Failure { doc, .. } => doc,
        }
    }

    /// 1-based page number this outcome belongs to.
    pub fn page(&self) -> usize {
        match self {
            UnitOutcome::Success { page, .. } | UnitOutcome::Failure { page, .. } => *page,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UnitOutcome::Success { .. })
    }
}

/// Aggregate result of an export batch.
///
/// `outcomes` holds one entry per attempted unit, in completion order —
/// which is not submission order when the pool runs concurrently. Sort by
/// `(doc, page)` if order matters downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Number of input documents.
    pub documents: usize,
    /// Total pages across all input documents.
    pub total_pages: usize,
    /// Units that produced an artifact.
    pub succeeded: usize,
    /// Units that failed (extraction, empty output, submission, crash).
    pub failed: usize,
    /// Pages never attempted because the batch was cancelled first.
    pub skipped: usize,
    /// True when the batch stopped early on a cancellation request.
    pub cancelled: bool,
    /// Wall-clock time for the whole batch.
    pub elapsed: Duration,
    /// Per-unit outcomes in completion order.
    pub outcomes: Vec<UnitOutcome>,
}

/// Compute the output destination for page `page` of `doc`.
///
/// Pure function of its inputs: `<root>/<stem>/<stem>_page_<N>.md`. Re-running
/// a batch therefore overwrites the same artifacts instead of accumulating
/// duplicates.
pub fn page_destination(output_root: &Path, doc: &Path, page: usize) -> PathBuf {
    let stem = doc
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    output_root
        .join(&stem)
        .join(format!("{stem}_page_{page}.md"))
}
