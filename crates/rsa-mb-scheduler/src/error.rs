//! Stage error types

use rsa_mb_core::{RequestId, Stage, Status, LANES};
use thiserror::Error;

/// Unrecoverable stage failure
///
/// Any of these aborts the stage: no further batches are dispatched, and
/// requests not yet reached keep `Outcome::Pending`. Incompatible requests
/// are not errors; they are recorded as `Outcome::Excluded`.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("{stage} batch {batch}: scratch buffer size query failed with {status}")]
    BufferSizeQuery {
        stage: Stage,
        batch: usize,
        status: Status,
    },

    #[error("{stage} batch {batch}: backend reported {aggregate}, lanes {lanes:?}")]
    BatchExecution {
        stage: Stage,
        batch: usize,
        aggregate: Status,
        lanes: [Status; LANES],
    },

    #[error("{stage}: key state for request {request} could not be materialized: {status}")]
    KeyState {
        stage: Stage,
        request: RequestId,
        status: Status,
    },

    #[error(transparent)]
    Core(#[from] rsa_mb_core::Error),
}

impl StageError {
    /// Stage the error aborted, if it came from one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            StageError::BufferSizeQuery { stage, .. }
            | StageError::BatchExecution { stage, .. }
            | StageError::KeyState { stage, .. } => Some(*stage),
            StageError::Core(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StageError>;
