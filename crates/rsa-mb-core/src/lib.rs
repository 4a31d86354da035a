//! rsa-mb-core: Core types for multi-buffer RSA batching
//!
//! This crate defines the vocabulary shared by the scheduler and every
//! backend implementation:
//! - `Request`: one encryption and/or decryption job with its own
//!   fixed-capacity operand buffers
//! - `MultiBufferBackend`: the contract of a vectorized modular
//!   exponentiation engine that processes `LANES` operands per call
//! - `Status` / `BatchStatus`: per-lane and aggregate outcome codes
//! - `ModPowOracle`: an independent arithmetic path used to cross-check
//!   batched results
//!
//! # Lane model
//!
//! A backend call always receives exactly `LANES` slots. Slots with no live
//! request are padding and carry `None` in every per-lane array. A backend
//! must answer padding slots with `Status::NullOperand` and report the call
//! as `Status::PartialBatchWarning` when not all lanes succeeded.
//!
//! | Aggregate | Lanes `< live` | Lanes `>= live` | Meaning |
//! |-----------|----------------|-----------------|---------|
//! | `NoError` | `NoError` | - | full batch, all good |
//! | `PartialBatchWarning` | `NoError` | `NullOperand` | short batch, all good |
//! | anything else | - | - | batch failed |

mod backend;
mod bignum;
mod config;
mod error;
mod key;
mod oracle;
mod request;
mod stage;
mod status;

pub mod fixtures;

pub use backend::{LaneIo, MultiBufferBackend};
pub use bignum::BigNum;
pub use config::{BatchConfig, CrtConfig, KeyConfig};
pub use error::Error;
pub use key::{PrivateKey, PrivateKeyVariant, PublicKey};
pub use oracle::{ModPowOracle, NumBigintOracle};
pub use request::{Outcome, Request, RequestId};
pub use stage::Stage;
pub use status::{BatchStatus, Status};

pub type Result<T> = std::result::Result<T, Error>;

/// Backend SIMD width: number of operand streams processed per call
pub const LANES: usize = 8;
