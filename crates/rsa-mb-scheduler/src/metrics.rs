//! Prometheus metrics for the batching pipeline
//!
//! Labels carry only the stage and outcome, never operand values.

use metrics::{counter, histogram};
use rsa_mb_core::{Stage, LANES};
use std::time::Duration;

pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_FAILURE: &str = "failure";
pub const OUTCOME_SIZE_QUERY_FAILED: &str = "size_query_failed";

pub const KIND_LIVE: &str = "live";
pub const KIND_PADDING: &str = "padding";

pub fn record_batch(stage: Stage, outcome: &str, live: usize, duration: Duration) {
    counter!("rsa_mb_batches_total", "stage" => stage.to_string(), "outcome" => outcome.to_string())
        .increment(1);
    counter!("rsa_mb_lanes_total", "stage" => stage.to_string(), "kind" => KIND_LIVE.to_string())
        .increment(live as u64);
    counter!("rsa_mb_lanes_total", "stage" => stage.to_string(), "kind" => KIND_PADDING.to_string())
        .increment(LANES.saturating_sub(live) as u64);
    histogram!("rsa_mb_batch_duration_seconds", "stage" => stage.to_string())
        .record(duration.as_secs_f64());
}

pub fn record_excluded(stage: Stage) {
    counter!("rsa_mb_requests_excluded_total", "stage" => stage.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

    fn counter(snapshotter: &Snapshotter, name: &str, labels: &[(&str, &str)]) -> Option<u64> {
        snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .find_map(|(key, _, _, value)| {
                let key = key.key();
                let matches = key.name() == name
                    && key.labels().count() == labels.len()
                    && labels.iter().all(|(label, expected)| {
                        key.labels().any(|l| l.key() == *label && l.value() == *expected)
                    });
                match value {
                    DebugValue::Counter(count) if matches => Some(count),
                    _ => None,
                }
            })
    }

    #[test]
    fn test_record_batch_names_and_labels() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_batch(Stage::Encrypt, OUTCOME_SUCCESS, 3, Duration::from_millis(2));
        });

        let batches = [("stage", "encrypt"), ("outcome", "success")];
        assert_eq!(counter(&snapshotter, "rsa_mb_batches_total", &batches), Some(1));
        let live = [("stage", "encrypt"), ("kind", "live")];
        assert_eq!(counter(&snapshotter, "rsa_mb_lanes_total", &live), Some(3));
        let padding = [("stage", "encrypt"), ("kind", "padding")];
        assert_eq!(counter(&snapshotter, "rsa_mb_lanes_total", &padding), Some(5));

        let durations = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter(|(key, _, _, _)| key.key().name() == "rsa_mb_batch_duration_seconds")
            .count();
        assert_eq!(durations, 1);
    }

    #[test]
    fn test_failed_batch_and_exclusions_labelled_by_stage() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_batch(Stage::Decrypt, OUTCOME_FAILURE, LANES, Duration::ZERO);
            record_excluded(Stage::Decrypt);
            record_excluded(Stage::Decrypt);
        });

        let batches = [("stage", "decrypt"), ("outcome", "failure")];
        assert_eq!(counter(&snapshotter, "rsa_mb_batches_total", &batches), Some(1));
        let padding = [("stage", "decrypt"), ("kind", "padding")];
        assert_eq!(counter(&snapshotter, "rsa_mb_lanes_total", &padding), Some(0));
        let excluded = [("stage", "decrypt")];
        let excluded = counter(&snapshotter, "rsa_mb_requests_excluded_total", &excluded);
        assert_eq!(excluded, Some(2));
    }
}
