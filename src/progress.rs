//! Progress-callback trait for per-unit export events.
//!
//! Inject an `Arc<dyn ExportProgressCallback>` via
//! [`crate::config::ExportConfigBuilder::progress`] to receive real-time
//! events as the scheduler dispatches and drains units.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a broadcast channel, a progress bar, or a job
//! database without the library knowing anything about how the host
//! application communicates. All methods are invoked from the coordinating
//! task, but the trait stays `Send + Sync` so implementations can be
//! shared with whatever threads consume the events.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Called by the scheduler as the batch progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ExportProgressCallback: Send + Sync {
    /// Called once before any unit is dispatched.
    ///
    /// `total_units` is the total page count across the batch.
    fn on_batch_start(&self, total_units: usize) {
        let _ = total_units;
    }

    /// Called when a unit is handed to the worker pool.
    fn on_unit_dispatched(&self, doc: &Path, page: usize) {
        let _ = (doc, page);
    }

    /// Called when a unit completes successfully.
    fn on_unit_complete(&self, doc: &Path, page: usize, destination: &Path, elapsed: Duration) {
        let _ = (doc, page, destination, elapsed);
    }

    /// Called when a unit fails (extraction error, empty output,
    /// submission failure, or worker crash).
    fn on_unit_error(&self, doc: &Path, page: usize, error: &str) {
        let _ = (doc, page, error);
    }

    /// Called once after the batch drains, before the report is returned.
    fn on_batch_complete(&self, total_units: usize, succeeded: usize) {
        let _ = (total_units, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in
/// [`crate::config::ExportConfig`].
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        dispatched: AtomicUsize,
        completed: AtomicUsize,
        errored: AtomicUsize,
        final_succeeded: AtomicUsize,
    }

    impl ExportProgressCallback for TrackingCallback {
        fn on_unit_dispatched(&self, _doc: &Path, _page: usize) {
            self.dispatched.fetch_add(1, Ordering::SeqCst);
        }

        fn on_unit_complete(&self, _doc: &Path, _page: usize, _dest: &Path, _elapsed: Duration) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }

        fn on_unit_error(&self, _doc: &Path, _page: usize, _error: &str) {
            self.errored.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total_units: usize, succeeded: usize) {
            self.final_succeeded.store(succeeded, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(4);
        cb.on_unit_dispatched(Path::new("a.pdf"), 1);
        cb.on_unit_complete(
            Path::new("a.pdf"),
            1,
            Path::new("out/a/a_page_1.md"),
            Duration::from_millis(5),
        );
        cb.on_unit_error(Path::new("a.pdf"), 2, "no output produced");
        cb.on_batch_complete(4, 3);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            dispatched: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            errored: AtomicUsize::new(0),
            final_succeeded: AtomicUsize::new(0),
        };

        tracker.on_unit_dispatched(Path::new("a.pdf"), 1);
        tracker.on_unit_dispatched(Path::new("a.pdf"), 2);
        tracker.on_unit_complete(
            Path::new("a.pdf"),
            1,
            Path::new("out/a/a_page_1.md"),
            Duration::from_millis(3),
        );
        tracker.on_unit_error(Path::new("a.pdf"), 2, "extraction failed: boom");
        tracker.on_batch_complete(2, 1);

        assert_eq!(tracker.dispatched.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completed.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errored.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.final_succeeded.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn ExportProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_unit_dispatched(Path::new("b.pdf"), 1);
    }
}
