//! The worker pool: a fixed set of isolated blocking workers.
//!
//! ## Why blocking threads, not async tasks?
//!
//! Extraction backends wrap C/C++ conversion libraries that are CPU-bound
//! and not async-safe. `tokio::task::spawn_blocking` gives each worker a
//! dedicated thread, so one worker stalling on a pathological page never
//! blocks the others or the coordinating task.
//!
//! ## Channel topology
//!
//! Units flow through one mpmc `flume` channel shared by all workers;
//! outcomes return on a second channel. `flume` exposes both sync and
//! async endpoints on the same channel, which lets blocking workers call
//! `recv()` while the scheduler awaits `recv_async()` — no mutexed
//! receiver, no polling.
//!
//! The unit channel is unbounded on purpose: boundedness comes from the
//! scheduler's admission caps, so a `submit` never blocks the coordinating
//! task. Every submitted unit yields exactly one outcome — extractor
//! errors, empty output, and panics are all converted into `Failure`
//! outcomes on the worker, never lost.

use crate::batch::{UnitOfWork, UnitOutcome};
use crate::error::{ExportError, UnitError};
use crate::extract::{ExtractorFactory, PageExtractor};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Handle to a running pool of extraction workers.
pub struct WorkerPool {
    unit_tx: flume::Sender<UnitOfWork>,
    outcome_rx: flume::Receiver<UnitOutcome>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `max_workers` workers, each owning one extractor instance.
    ///
    /// All extractors are constructed up front so a factory failure aborts
    /// here, before any unit is submitted — the "batch could not start"
    /// path of [`ExportError::PoolStart`].
    pub fn start(
        factory: &Arc<dyn ExtractorFactory>,
        max_workers: usize,
    ) -> Result<Self, ExportError> {
        let mut extractors = Vec::with_capacity(max_workers);
        for _ in 0..max_workers {
            extractors.push(factory.create().map_err(|e| ExportError::PoolStart {
                detail: e.to_string(),
            })?);
        }

        let (unit_tx, unit_rx) = flume::unbounded::<UnitOfWork>();
        let (outcome_tx, outcome_rx) = flume::unbounded::<UnitOutcome>();

        let workers = extractors
            .into_iter()
            .enumerate()
            .map(|(id, extractor)| {
                let unit_rx = unit_rx.clone();
                let outcome_tx = outcome_tx.clone();
                tokio::task::spawn_blocking(move || worker_loop(id, extractor, unit_rx, outcome_tx))
            })
            .collect();

        Ok(Self {
            unit_tx,
            outcome_rx,
            workers,
        })
    }

    /// Queue a unit for execution. Never blocks.
    ///
    /// On failure (all workers gone) the unit is handed back so the caller
    /// can synthesize a `Failure` outcome and keep its bookkeeping
    /// consistent.
    pub fn submit(&self, unit: UnitOfWork) -> Result<(), UnitOfWork> {
        self.unit_tx
            .send(unit)
            .map_err(|flume::SendError(unit)| unit)
    }

    /// Await the next completed outcome.
    ///
    /// Returns `None` only if every worker has stopped while the caller
    /// still expects completions.
    pub async fn recv(&self) -> Option<UnitOutcome> {
        self.outcome_rx.recv_async().await.ok()
    }

    /// Take an already-completed outcome without waiting.
    pub fn try_recv(&self) -> Option<UnitOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    /// Close the unit channel and join all workers.
    pub async fn shutdown(self) {
        drop(self.unit_tx);
        for handle in self.workers {
            // A worker that panicked outside catch_unwind has already had
            // its in-flight unit synthesized by the scheduler; nothing to
            // do with the join error here.
            let _ = handle.await;
        }
    }
}

/// One worker: pull units until the channel closes, one at a time.
fn worker_loop(
    id: usize,
    mut extractor: Box<dyn PageExtractor>,
    unit_rx: flume::Receiver<UnitOfWork>,
    outcome_tx: flume::Sender<UnitOutcome>,
) {
    debug!(worker = id, "extract worker started");

    while let Ok(unit) = unit_rx.recv() {
        let outcome = run_unit(extractor.as_mut(), &unit);
        if outcome_tx.send(outcome).is_err() {
            // Scheduler dropped its receiver; nobody is listening.
            break;
        }
    }

    debug!(worker = id, "extract worker stopped");
}

/// Execute one unit, converting every failure mode into an outcome.
fn run_unit(extractor: &mut dyn PageExtractor, unit: &UnitOfWork) -> UnitOutcome {
    let start = Instant::now();

    // A panicking backend poisons nothing shared: the extractor instance
    // is owned by this worker alone, so the worst case after unwinding is
    // that subsequent units on this worker also fail — visibly, as
    // outcomes, not as lost units.
    let result = catch_unwind(AssertUnwindSafe(|| extractor.extract(unit)));

    match result {
        Ok(Ok(Some(extraction))) => {
            trace!(
                doc = %unit.doc.display(),
                page = unit.page,
                bytes = extraction.bytes,
                "page extracted"
            );
            UnitOutcome::Success {
                doc: unit.doc.clone(),
                page: unit.page,
                destination: extraction.destination,
                elapsed: start.elapsed(),
            }
        }
        Ok(Ok(None)) => UnitOutcome::Failure {
            doc: unit.doc.clone(),
            page: unit.page,
            error: UnitError::EmptyOutput,
        },
        Ok(Err(e)) => UnitOutcome::Failure {
            doc: unit.doc.clone(),
            page: unit.page,
            error: UnitError::Extraction {
                detail: e.to_string(),
            },
        },
        Err(panic) => UnitOutcome::Failure {
            doc: unit.doc.clone(),
            page: unit.page,
            error: UnitError::WorkerCrashed {
                detail: panic_detail(panic),
            },
        },
    }
}

fn panic_detail(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "extractor panicked".to_string()
    }
}
