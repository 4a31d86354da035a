//! Backend status codes

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::LANES;

/// Outcome code reported by a multi-buffer backend
///
/// Used both per lane and for the call as a whole. Numeric codes follow the
/// conventions of vendor multi-buffer libraries so that logs line up with
/// their documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Operation completed
    NoError,
    /// A required operand was absent (expected for padding lanes)
    NullOperand,
    /// Not every lane reported `NoError`; inspect the per-lane array
    PartialBatchWarning,
    /// A buffer or key state is too small for the operand
    SizeError,
    /// An operand is outside its valid range (e.g. input >= N)
    OutOfRange,
    /// Key state is uninitialized or of the wrong kind
    ContextMismatch,
    /// Lanes disagree on a batch-wide parameter
    BadArgument,
}

impl Status {
    /// Vendor-style numeric code
    pub fn code(&self) -> i32 {
        match self {
            Status::NoError => 0,
            Status::NullOperand => -8,
            Status::PartialBatchWarning => 53,
            Status::SizeError => -6,
            Status::OutOfRange => -11,
            Status::ContextMismatch => -13,
            Status::BadArgument => -5,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Status::NoError)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::NoError => "no error",
            Status::NullOperand => "null operand",
            Status::PartialBatchWarning => "partial batch warning",
            Status::SizeError => "size error",
            Status::OutOfRange => "out of range",
            Status::ContextMismatch => "context mismatch",
            Status::BadArgument => "bad argument",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// Aggregate and per-lane statuses returned by one batched call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatus {
    pub aggregate: Status,
    pub lanes: [Status; LANES],
}

impl BatchStatus {
    /// Derive the aggregate from per-lane results
    ///
    /// All lanes clean gives `NoError`; every lane absent gives
    /// `NullOperand`; anything else is a `PartialBatchWarning`.
    pub fn from_lanes(lanes: [Status; LANES]) -> Self {
        let aggregate = if lanes.iter().all(Status::is_ok) {
            Status::NoError
        } else if lanes.iter().all(|s| *s == Status::NullOperand) {
            Status::NullOperand
        } else {
            Status::PartialBatchWarning
        };
        Self { aggregate, lanes }
    }

    /// A call rejected before any lane was processed
    pub fn rejected(status: Status) -> Self {
        Self {
            aggregate: status,
            lanes: [status; LANES],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lanes_all_ok() {
        let batch = BatchStatus::from_lanes([Status::NoError; LANES]);
        assert_eq!(batch.aggregate, Status::NoError);
    }

    #[test]
    fn test_from_lanes_padding_is_warning() {
        let mut lanes = [Status::NullOperand; LANES];
        lanes[0] = Status::NoError;
        assert_eq!(BatchStatus::from_lanes(lanes).aggregate, Status::PartialBatchWarning);
    }

    #[test]
    fn test_from_lanes_all_absent() {
        let batch = BatchStatus::from_lanes([Status::NullOperand; LANES]);
        assert_eq!(batch.aggregate, Status::NullOperand);
    }

    #[test]
    fn test_display_includes_code() {
        assert_eq!(Status::PartialBatchWarning.to_string(), "partial batch warning (53)");
        assert_eq!(Status::NullOperand.to_string(), "null operand (-8)");
    }
}
