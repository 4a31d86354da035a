//! Batch status reconciliation
//!
//! A backend reports `PartialBatchWarning` whenever any lane is non-ok,
//! which includes the padding lanes of a partial batch. A batch with fewer
//! than `LANES` live lanes succeeded if and only if every live lane is
//! `NoError` and every padding lane is `NullOperand`. On a full batch the
//! warning is a failure.

use rsa_mb_core::{BatchStatus, Status, LANES};
use serde::{Deserialize, Serialize};

/// Reconciled result of one dispatched batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Success,
    Failure,
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Success => "success",
            Verdict::Failure => "failure",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected status of `lane` in a batch with `live` real lanes
fn expected(lane: usize, live: usize) -> Status {
    if lane < live {
        Status::NoError
    } else {
        Status::NullOperand
    }
}

/// Decide whether a batch with `live` real lanes succeeded
///
/// Pure: the same inputs always give the same verdict.
pub fn reconcile(batch: &BatchStatus, live: usize) -> Verdict {
    match batch.aggregate {
        Status::NoError => Verdict::Success,
        Status::PartialBatchWarning if live < LANES => {
            let clean = batch
                .lanes
                .iter()
                .enumerate()
                .all(|(lane, status)| *status == expected(lane, live));
            if clean {
                Verdict::Success
            } else {
                Verdict::Failure
            }
        }
        _ => Verdict::Failure,
    }
}

/// Lanes whose status differs from what a clean batch reports
pub fn failed_lanes(batch: &BatchStatus, live: usize) -> Vec<usize> {
    let live = live.min(LANES);
    batch
        .lanes
        .iter()
        .enumerate()
        .filter(|(lane, status)| **status != expected(*lane, live))
        .map(|(lane, _)| lane)
        .collect()
}
