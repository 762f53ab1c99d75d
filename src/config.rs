//! Configuration types for batch export.
//!
//! All scheduling behaviour is controlled through [`ExportConfig`], built
//! via its [`ExportConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across batches, log them, and diff two runs
//! to understand why their throughput differs.
//!
//! # Design choice: two caps, not one
//! `max_workers` bounds how many pages convert in parallel;
//! `max_outstanding` bounds how many units may be buffered ahead of the
//! workers. Decoupling them is deliberate backpressure: enumerating a very
//! large document set and submitting every page at once would exhaust
//! memory long before the pool drains the queue.

use crate::error::ExportError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Opaque options handed through to the extractor with every unit.
///
/// The scheduler never interprets these. `params` is a free-form bag for
/// backend-specific switches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Enable backend plugins, when the extraction backend supports them.
    pub enable_plugins: bool,
    /// Backend-specific parameters, passed through verbatim.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Configuration for a batch export.
///
/// Built via [`ExportConfig::builder()`] or using
/// [`ExportConfig::default()`].
///
/// # Example
/// ```rust
/// use mdexport::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .max_workers(4)
///     .max_outstanding(16)
///     .per_document_cap(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// Number of worker slots converting pages in parallel.
    /// Default: available parallelism minus one, minimum 1.
    ///
    /// Leaving one core free keeps the coordinating task and the rest of
    /// the host application responsive while workers churn through
    /// CPU-bound extraction.
    pub max_workers: usize,

    /// Global cap on units outstanding (submitted but unresolved) across
    /// all documents. Default: `max_workers × 4`.
    ///
    /// Bounds peak memory independently of worker count. Four units per
    /// worker keeps every slot busy through completion bursts without
    /// buffering an entire large batch up front.
    pub max_outstanding: usize,

    /// Cap on units outstanding for any single document. Default: 2.
    ///
    /// Bounds how much of one document's work can crowd out others.
    /// Deployments trade fairness for locality by raising this — anywhere
    /// from 2 (many small documents) up to 50 (one huge scan job).
    pub per_document_cap: usize,

    /// Root directory under which per-document output directories are
    /// derived. Default: `results/MD`.
    ///
    /// Page artifacts land at `<output_root>/<stem>/<stem>_page_<N>.md`;
    /// see [`crate::batch::page_destination`].
    pub output_root: PathBuf,

    /// Options passed opaquely to the extractor with each unit.
    pub options: ExtractOptions,

    /// Per-unit progress callbacks. Default: none.
    pub progress: Option<ProgressCallback>,

    /// Cooperative cancellation. Checked at the top of each admission
    /// phase; in-flight units drain normally. Default: none.
    pub cancellation: Option<CancellationToken>,
}

fn default_max_workers() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cpus.saturating_sub(1).max(1)
}

impl Default for ExportConfig {
    fn default() -> Self {
        let max_workers = default_max_workers();
        Self {
            max_workers,
            max_outstanding: max_workers * 4,
            per_document_cap: 2,
            output_root: PathBuf::from("results/MD"),
            options: ExtractOptions::default(),
            progress: None,
            cancellation: None,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("max_workers", &self.max_workers)
            .field("max_outstanding", &self.max_outstanding)
            .field("per_document_cap", &self.per_document_cap)
            .field("output_root", &self.output_root)
            .field("options", &self.options)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn ExportProgressCallback>"))
            .field("cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
            explicit_outstanding: false,
        }
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
    /// Set when the caller chose `max_outstanding` explicitly; otherwise
    /// `build()` re-derives it from the final `max_workers`.
    explicit_outstanding: bool,
}

impl ExportConfigBuilder {
    pub fn max_workers(mut self, n: usize) -> Self {
        self.config.max_workers = n.max(1);
        self
    }

    pub fn max_outstanding(mut self, n: usize) -> Self {
        self.config.max_outstanding = n.max(1);
        self.explicit_outstanding = true;
        self
    }

    pub fn per_document_cap(mut self, n: usize) -> Self {
        self.config.per_document_cap = n.max(1);
        self
    }

    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.output_root = root.into();
        self
    }

    pub fn options(mut self, options: ExtractOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn enable_plugins(mut self, v: bool) -> Self {
        self.config.options.enable_plugins = v;
        self
    }

    pub fn progress(mut self, callback: ProgressCallback) -> Self {
        self.config.progress = Some(callback);
        self
    }

    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.config.cancellation = Some(token);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ExportConfig, ExportError> {
        if !self.explicit_outstanding {
            self.config.max_outstanding = self.config.max_workers * 4;
        }
        let c = &self.config;
        if c.max_workers == 0 {
            return Err(ExportError::InvalidConfig("max_workers must be ≥ 1".into()));
        }
        if c.max_outstanding == 0 {
            return Err(ExportError::InvalidConfig(
                "max_outstanding must be ≥ 1".into(),
            ));
        }
        if c.per_document_cap == 0 {
            return Err(ExportError::InvalidConfig(
                "per_document_cap must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
