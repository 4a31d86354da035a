//! rsa-mb-scheduler: Lane batching for multi-buffer RSA backends
//!
//! Turns a stream of independent RSA requests into full-width backend
//! calls:
//! - `compat`: admission predicates comparing each request with the one
//!   admitted before it
//! - `batcher`: fills `LANES`-wide lane arrays, pads and flushes them
//! - `invoker`: materializes key states, sizes scratch memory and runs the
//!   batched call
//! - `reconcile`: tells a clean partial batch from a failed one
//!
//! A stage aborts on the first unrecoverable failure (`StageError`). An
//! incompatible request never fails a stage: it is excluded and skipped by
//! every later stage.
//!
//! ```no_run
//! use rsa_mb_core::{BatchConfig, KeyConfig};
//! use rsa_mb_scheduler::Pipeline;
//! # fn run<B: rsa_mb_core::MultiBufferBackend>(backend: &B) -> rsa_mb_scheduler::Result<()> {
//! let pipeline = Pipeline::new(backend, BatchConfig::default().with_verify(true))?;
//! let plaintexts = (1u32..=20).map(num_bigint::BigUint::from);
//! let mut requests = pipeline.requests_from_key(&KeyConfig::reference_1024(), 0, plaintexts)?;
//! let report = pipeline.run(&mut requests)?;
//! assert_eq!(report.encrypt.batches, 3);
//! # Ok(())
//! # }
//! ```

pub mod batcher;
pub mod compat;
pub mod error;
pub mod invoker;
pub mod lanes;
pub mod metrics;
pub mod powm;
pub mod reconcile;
pub mod stage;
pub mod verify;

pub use batcher::{BatcherState, LaneBatcher};
pub use compat::{decryption_compatible, encryption_compatible};
pub use error::{Result, StageError};
pub use invoker::{Admission, Decrypt, Direction, Encrypt};
pub use lanes::{LaneArray, Slot};
pub use powm::batch_mod_pow;
pub use reconcile::{reconcile, Verdict};
pub use stage::{decrypt_stage, encrypt_stage, Pipeline, PipelineReport, StageReport};
pub use verify::{verify_requests, VerifyReport};
