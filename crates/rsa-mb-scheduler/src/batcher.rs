//! Lane batcher: groups a request stream into backend-width batches
//!
//! State machine per stage:
//! ```text
//! Collecting --(lanes full)--------> ReadyToFlush --> Draining --> Collecting
//! Collecting --(end of stream,
//!               lanes non-empty)---> ReadyToFlush --> Draining --> done
//! ```
//!
//! Every batch releases its key states and scratch memory before the next
//! one is collected, whether it succeeded or not.

use std::marker::PhantomData;
use std::time::Instant;

use rsa_mb_core::{MultiBufferBackend, Outcome, Request, LANES};
use tracing::{debug, error, info, warn};

use crate::error::{Result, StageError};
use crate::invoker::{self, Admission, Direction};
use crate::lanes::LaneArray;
use crate::metrics;
use crate::reconcile::{failed_lanes, reconcile, Verdict};
use crate::stage::StageReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatcherState {
    Collecting,
    ReadyToFlush,
    Draining,
}

pub struct LaneBatcher<'b, B, D>
where
    B: MultiBufferBackend,
    D: Direction<B>,
{
    backend: &'b B,
    lanes: LaneArray<D::KeyState>,
    state: BatcherState,
    report: StageReport,
    _direction: PhantomData<D>,
}

impl<'b, B, D> LaneBatcher<'b, B, D>
where
    B: MultiBufferBackend,
    D: Direction<B>,
{
    pub fn new(backend: &'b B) -> Self {
        Self {
            backend,
            lanes: LaneArray::new(),
            state: BatcherState::Collecting,
            report: StageReport::new(D::STAGE),
            _direction: PhantomData,
        }
    }

    pub fn state(&self) -> BatcherState {
        self.state
    }

    /// Run the whole stage over `requests`, in order
    ///
    /// Stops at the first hard failure. Outcomes recorded before the
    /// failure are kept in the requests.
    pub fn run(mut self, requests: &mut [Request]) -> Result<StageReport> {
        let stage = D::STAGE;
        let started = Instant::now();
        info!(
            stage = %stage,
            backend = self.backend.name(),
            requests = requests.len(),
            "Starting stage"
        );

        for index in 0..requests.len() {
            self.collect(requests, index)?;
            if self.lanes.is_full() {
                self.state = BatcherState::ReadyToFlush;
                self.drain(requests)?;
            }
        }

        // A trailing partial batch is flushed even when the last request
        // of the stream was not admitted.
        if !self.lanes.is_empty() {
            self.state = BatcherState::ReadyToFlush;
            self.drain(requests)?;
        }

        self.report.elapsed = started.elapsed();
        info!(
            stage = %stage,
            batches = self.report.batches,
            completed = self.report.completed,
            excluded = self.report.excluded,
            skipped = self.report.skipped,
            elapsed_ms = self.report.elapsed.as_millis() as u64,
            "Stage complete"
        );
        Ok(self.report)
    }

    fn collect(&mut self, requests: &mut [Request], index: usize) -> Result<()> {
        let stage = D::STAGE;

        let eligible = {
            let request = &requests[index];
            request.supports(stage) && request.is_compatible()
        };
        if !eligible {
            requests[index].set_outcome(stage, Outcome::Skipped);
            self.report.skipped += 1;
            return Ok(());
        }

        let admission = if self.predecessor_rejects(requests, index) {
            Admission::Incompatible
        } else {
            let prev = self
                .lanes
                .last_live()
                .map(|(prev_index, key)| (&requests[prev_index], key));
            D::admit(self.backend, prev, &requests[index])
        };

        match admission {
            Admission::Admitted(key) => {
                self.lanes.push(index, key);
                debug!(
                    stage = %stage,
                    request = requests[index].id(),
                    lane = self.lanes.live() - 1,
                    "Request admitted"
                );
            }
            Admission::Incompatible => {
                let request = &mut requests[index];
                request.mark_incompatible();
                request.set_outcome(stage, Outcome::Excluded);
                self.report.excluded += 1;
                metrics::record_excluded(stage);
                warn!(
                    stage = %stage,
                    request = request.id(),
                    bits_n = request.bits_n(),
                    "Request incompatible with current batch, excluded"
                );
            }
            Admission::Failed(status) => {
                let request = requests[index].id();
                error!(
                    stage = %stage,
                    request,
                    status = %status,
                    "Key state materialization failed"
                );
                return Err(StageError::KeyState {
                    stage,
                    request,
                    status,
                });
            }
        }
        Ok(())
    }

    /// Whether the request right before `index` rules it out
    ///
    /// Only applies mid-batch when that request was not admitted itself;
    /// an admitted predecessor is already the `prev` of `D::admit`.
    fn predecessor_rejects(&self, requests: &[Request], index: usize) -> bool {
        let Some(pred_index) = index.checked_sub(1) else {
            return false;
        };
        let Some((last_index, _)) = self.lanes.last_live() else {
            return false;
        };
        if last_index == pred_index {
            return false;
        }
        let pred = &requests[pred_index];
        pred.supports(D::STAGE) && !D::requests_compatible(pred, &requests[index])
    }

    fn drain(&mut self, requests: &mut [Request]) -> Result<()> {
        let stage = D::STAGE;
        let batch = self.report.batches;
        let live = self.lanes.seal();
        let indices = self.lanes.request_indices();

        self.state = BatcherState::Draining;
        let started = Instant::now();
        let dispatched = invoker::dispatch::<B, D>(self.backend, &self.lanes, requests);
        let duration = started.elapsed();

        self.lanes.clear();
        self.state = BatcherState::Collecting;

        let status = match dispatched {
            Ok(status) => status,
            Err(status) => {
                metrics::record_batch(stage, metrics::OUTCOME_SIZE_QUERY_FAILED, live, duration);
                error!(stage = %stage, batch, live, status = %status, "Scratch size query failed");
                return Err(StageError::BufferSizeQuery {
                    stage,
                    batch,
                    status,
                });
            }
        };

        self.report.batches += 1;
        self.report.live_lanes += live;
        self.report.padding_lanes += LANES - live;

        let verdict = reconcile(&status, live);
        let outcome = match verdict {
            Verdict::Success => Outcome::Completed,
            Verdict::Failure => Outcome::Failed,
        };
        for index in indices.iter().flatten() {
            requests[*index].set_outcome(stage, outcome);
        }

        match verdict {
            Verdict::Success => {
                metrics::record_batch(stage, metrics::OUTCOME_SUCCESS, live, duration);
                self.report.completed += live;
                debug!(
                    stage = %stage,
                    batch,
                    live,
                    aggregate = %status.aggregate,
                    "Batch complete"
                );
                Ok(())
            }
            Verdict::Failure => {
                metrics::record_batch(stage, metrics::OUTCOME_FAILURE, live, duration);
                error!(
                    stage = %stage,
                    batch,
                    live,
                    aggregate = %status.aggregate,
                    failed_lanes = ?failed_lanes(&status, live),
                    "Batch failed, aborting stage"
                );
                Err(StageError::BatchExecution {
                    stage,
                    batch,
                    aggregate: status.aggregate,
                    lanes: status.lanes,
                })
            }
        }
    }
}
