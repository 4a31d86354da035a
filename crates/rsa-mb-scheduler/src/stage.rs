//! Encryption and decryption stages, and the pipeline that chains them

use std::time::Duration;

use num_bigint::BigUint;
use rsa_mb_core::{
    BatchConfig, KeyConfig, ModPowOracle, MultiBufferBackend, NumBigintOracle, Request,
    RequestId, Stage,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::batcher::LaneBatcher;
use crate::error::Result;
use crate::invoker::{Decrypt, Encrypt};
use crate::verify::{verify_requests, VerifyReport};

/// Counters for one stage run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    /// Batched calls dispatched
    pub batches: usize,
    pub live_lanes: usize,
    pub padding_lanes: usize,
    pub completed: usize,
    pub excluded: usize,
    /// Requests with no key for this stage, or excluded earlier
    pub skipped: usize,
    pub elapsed: Duration,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            ..Default::default()
        }
    }

    /// Completed operations per second over the stage
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.completed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Encrypt every eligible request, `LANES` at a time
pub fn encrypt_stage<B: MultiBufferBackend>(
    backend: &B,
    requests: &mut [Request],
) -> Result<StageReport> {
    LaneBatcher::<B, Encrypt>::new(backend).run(requests)
}

/// Decrypt every eligible request, `LANES` at a time
///
/// Requests excluded by the encryption stage are skipped.
pub fn decrypt_stage<B: MultiBufferBackend>(
    backend: &B,
    requests: &mut [Request],
) -> Result<StageReport> {
    LaneBatcher::<B, Decrypt>::new(backend).run(requests)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub backend: String,
    pub requests: usize,
    pub encrypt: StageReport,
    pub decrypt: StageReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify: Option<VerifyReport>,
}

/// Encrypt stage, decrypt stage, then optional oracle verification
pub struct Pipeline<'b, B, O = NumBigintOracle> {
    backend: &'b B,
    config: BatchConfig,
    oracle: O,
}

impl<'b, B: MultiBufferBackend> Pipeline<'b, B> {
    pub fn new(backend: &'b B, config: BatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            config,
            oracle: NumBigintOracle,
        })
    }
}

impl<'b, B: MultiBufferBackend, O: ModPowOracle> Pipeline<'b, B, O> {
    /// Verify against a different oracle
    pub fn with_oracle<P: ModPowOracle>(self, oracle: P) -> Pipeline<'b, B, P> {
        Pipeline {
            backend: self.backend,
            config: self.config,
            oracle,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Round-trip requests for `plaintexts` under one key
    ///
    /// The private key is built in the configured representation. Ids are
    /// assigned in order starting at `first_id`.
    pub fn requests_from_key(
        &self,
        key: &KeyConfig,
        first_id: RequestId,
        plaintexts: impl IntoIterator<Item = BigUint>,
    ) -> Result<Vec<Request>> {
        let public_key = key.public_key()?;
        let private_key = key.private_key(self.config.private_key_variant)?;
        let mut requests = Vec::new();
        for (id, plaintext) in (first_id..).zip(plaintexts) {
            requests.push(Request::new(
                id,
                plaintext,
                public_key.clone(),
                private_key.clone(),
            )?);
        }
        Ok(requests)
    }

    pub fn run(&self, requests: &mut [Request]) -> Result<PipelineReport> {
        let encrypt = encrypt_stage(self.backend, requests)?;
        let decrypt = decrypt_stage(self.backend, requests)?;

        let verify = if self.config.verify {
            let report = verify_requests(&self.oracle, requests);
            info!(
                checked = report.checked,
                mismatches = report.mismatches.len(),
                "Oracle verification complete"
            );
            Some(report)
        } else {
            None
        };

        Ok(PipelineReport {
            backend: self.backend.name().to_string(),
            requests: requests.len(),
            encrypt,
            decrypt,
            verify,
        })
    }
}
