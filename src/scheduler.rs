//! The admission-control loop: two caps, fixed-order fairness, drain on
//! first completion.
//!
//! ## State ownership
//!
//! All bookkeeping here — per-document counters, the in-flight set, the
//! outcome tally — is owned and mutated by the coordinating task alone.
//! Workers never touch it; they communicate only by sending outcomes back
//! through the pool. That single-owner discipline is what lets the loop
//! run without a single lock.
//!
//! ## The two phases
//!
//! *Admission*: while the global outstanding count is under
//! `max_outstanding`, scan the documents in their fixed input order and
//! dispatch the next unstarted page of the first document under its
//! per-document cap, restarting the scan from the top after every
//! dispatch. The restart is the tie-break: the earliest document with
//! spare capacity always wins, so a 1-page document never waits behind a
//! 1000-page one (its first page is picked up on the very next pass).
//!
//! *Drain*: await the first completion — a genuine blocking wait, not a
//! poll — then absorb every outcome that is already ready, freeing
//! capacity before the next admission pass.
//!
//! Termination: every document exhausted (`next_page > num_pages`) and
//! nothing in flight. Cancellation short-circuits admission only;
//! in-flight units always drain.

use crate::batch::{page_destination, DocumentSpec, UnitOfWork, UnitOutcome};
use crate::config::ExportConfig;
use crate::error::UnitError;
use crate::pool::WorkerPool;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::{error, info, trace, warn};

/// Per-document bookkeeping. `1 ≤ next_page ≤ num_pages + 1`; once
/// `next_page > num_pages` the document is exhausted and no further units
/// are created for it.
struct DocumentState {
    spec: DocumentSpec,
    /// Next unstarted page, 1-based, monotonically increasing.
    next_page: usize,
    /// Units currently outstanding for this document.
    outstanding: usize,
}

impl DocumentState {
    fn new(spec: DocumentSpec) -> Self {
        Self {
            spec,
            next_page: 1,
            outstanding: 0,
        }
    }

    fn has_unstarted(&self) -> bool {
        self.next_page <= self.spec.num_pages
    }

    /// Pages never dispatched (nor skipped) for this document.
    fn remaining(&self) -> usize {
        self.spec.num_pages + 1 - self.next_page
    }
}

/// Index of the first document that may receive a unit right now.
///
/// Fixed-order scan from the top: strict earliest-document-first, not
/// round-robin-by-last-served.
fn next_admissible(docs: &[DocumentState], per_document_cap: usize) -> Option<usize> {
    docs.iter()
        .position(|d| d.has_unstarted() && d.outstanding < per_document_cap)
}

/// What the loop hands back to [`crate::export::export_documents`].
pub(crate) struct ScheduleSummary {
    pub outcomes: Vec<UnitOutcome>,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: bool,
}

/// The coordinating state machine. One instance per batch.
pub(crate) struct Scheduler<'a> {
    config: &'a ExportConfig,
    docs: Vec<DocumentState>,
    /// Document identity → position, for routing outcomes back.
    doc_index: HashMap<PathBuf, usize>,
    /// Outstanding units as `(doc_index, page)`. Its length is the global
    /// outstanding count; its contents let us synthesize failures if the
    /// pool dies with units in flight.
    in_flight: HashSet<(usize, usize)>,
    outcomes: Vec<UnitOutcome>,
    succeeded: usize,
    failed: usize,
    cancelled: bool,
}

impl<'a> Scheduler<'a> {
    pub fn new(specs: Vec<DocumentSpec>, config: &'a ExportConfig) -> Self {
        let doc_index = specs
            .iter()
            .enumerate()
            .map(|(i, s)| (s.path.clone(), i))
            .collect();
        Self {
            config,
            docs: specs.into_iter().map(DocumentState::new).collect(),
            doc_index,
            in_flight: HashSet::new(),
            outcomes: Vec::new(),
            succeeded: 0,
            failed: 0,
            cancelled: false,
        }
    }

    /// Run admission/drain cycles until every document is exhausted and
    /// nothing is in flight (or cancellation drains the batch early).
    pub async fn run(mut self, pool: &WorkerPool) -> ScheduleSummary {
        loop {
            if !self.cancelled
                && self
                    .config
                    .cancellation
                    .as_ref()
                    .is_some_and(|t| t.is_cancelled())
            {
                self.cancelled = true;
                info!("cancellation requested, draining in-flight units");
            }

            if !self.cancelled {
                self.admit(pool);
            }

            if self.in_flight.is_empty() {
                if self.cancelled || self.docs.iter().all(|d| !d.has_unstarted()) {
                    break;
                }
                // Nothing in flight yet nothing admissible: transient with
                // validated caps, so yield once and rescan instead of
                // spinning.
                tokio::task::yield_now().await;
                continue;
            }

            match pool.recv().await {
                Some(outcome) => {
                    self.record_completion(outcome);
                    while let Some(ready) = pool.try_recv() {
                        self.record_completion(ready);
                    }
                }
                None => {
                    self.abandon_in_flight();
                    break;
                }
            }
        }

        let skipped = self.docs.iter().map(DocumentState::remaining).sum();
        ScheduleSummary {
            outcomes: self.outcomes,
            succeeded: self.succeeded,
            failed: self.failed,
            skipped,
            cancelled: self.cancelled,
        }
    }

    /// Admission phase: top up outstanding work to the caps.
    fn admit(&mut self, pool: &WorkerPool) {
        while self.in_flight.len() < self.config.max_outstanding {
            let Some(i) = next_admissible(&self.docs, self.config.per_document_cap) else {
                break;
            };

            let (doc_path, page) = {
                let doc = &mut self.docs[i];
                let page = doc.next_page;
                // Advances whether or not the submit below succeeds: a
                // failed submission marks the page failed and skips past
                // it, so the document can never wedge the scan.
                doc.next_page += 1;
                (doc.spec.path.clone(), page)
            };

            let unit = UnitOfWork {
                doc: doc_path.clone(),
                page,
                destination: page_destination(&self.config.output_root, &doc_path, page),
                options: self.config.options.clone(),
            };

            match pool.submit(unit) {
                Ok(()) => {
                    self.docs[i].outstanding += 1;
                    self.in_flight.insert((i, page));
                    trace!(doc = %doc_path.display(), page, "unit dispatched");
                    if let Some(cb) = &self.config.progress {
                        cb.on_unit_dispatched(&doc_path, page);
                    }
                }
                Err(unit) => {
                    warn!(
                        doc = %unit.doc.display(),
                        page = unit.page,
                        "worker pool rejected unit, marking page failed"
                    );
                    self.note_outcome(UnitOutcome::Failure {
                        doc: unit.doc,
                        page: unit.page,
                        error: UnitError::Submission {
                            detail: "worker pool rejected the unit".into(),
                        },
                    });
                }
            }
        }
    }

    /// Drain bookkeeping for one outcome returned by the pool.
    fn record_completion(&mut self, outcome: UnitOutcome) {
        if let Some(&i) = self.doc_index.get(outcome.doc()) {
            self.in_flight.remove(&(i, outcome.page()));
            self.docs[i].outstanding = self.docs[i].outstanding.saturating_sub(1);
        }
        self.note_outcome(outcome);
    }

    /// The pool stopped with units still in flight: synthesize a failure
    /// for each so every submitted unit still yields exactly one outcome.
    fn abandon_in_flight(&mut self) {
        error!(
            units = self.in_flight.len(),
            "worker pool stopped with units in flight"
        );
        let abandoned: Vec<(usize, usize)> = self.in_flight.drain().collect();
        for (i, page) in abandoned {
            self.docs[i].outstanding = self.docs[i].outstanding.saturating_sub(1);
            self.note_outcome(UnitOutcome::Failure {
                doc: self.docs[i].spec.path.clone(),
                page,
                error: UnitError::WorkerCrashed {
                    detail: "worker pool stopped before the unit completed".into(),
                },
            });
        }
    }

    /// Tally, log, and report one outcome (from the pool or synthesized).
    fn note_outcome(&mut self, outcome: UnitOutcome) {
        match &outcome {
            UnitOutcome::Success {
                doc,
                page,
                destination,
                elapsed,
            } => {
                self.succeeded += 1;
                info!(
                    doc = %doc.display(),
                    page,
                    destination = %destination.display(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "page converted"
                );
                if let Some(cb) = &self.config.progress {
                    cb.on_unit_complete(doc, *page, destination, *elapsed);
                }
            }
            UnitOutcome::Failure { doc, page, error } => {
                self.failed += 1;
                error!(doc = %doc.display(), page, %error, "page failed");
                if let Some(cb) = &self.config.progress {
                    cb.on_unit_error(doc, *page, &error.to_string());
                }
            }
        }
        self.outcomes.push(outcome);
    }
}
