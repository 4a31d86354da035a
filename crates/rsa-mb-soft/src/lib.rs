//! rsa-mb-soft: Portable software multi-buffer RSA backend
//!
//! Implements the `MultiBufferBackend` contract lane by lane with
//! `num-bigint`. It keeps the exact calling conventions of a vectorized
//! engine (fixed `LANES`-wide arrays, size queries, null-operand padding
//! lanes, partial-batch warnings), so schedulers can be developed and tested
//! without vendor libraries.

mod state;

pub use state::{SoftPrivateKeyState, SoftPublicKeyState};

use num_bigint::BigUint;
use num_integer::Integer;
use rsa_mb_core::{
    BatchStatus, LaneIo, MultiBufferBackend, PrivateKey, PrivateKeyVariant, PublicKey, Status,
    LANES,
};
use tracing::trace;

use crate::state::{limb_bytes, LoadedPrivateKey, STATE_HEADER_BYTES};

/// Scratch words per lane: base, accumulator, double-width product, modulus
const SCRATCH_WORDS_PER_LANE: usize = 5;

/// Reference backend computing each lane with `BigUint::modpow`
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareBackend;

impl SoftwareBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Shared scratch sizing: every live lane must have the same modulus width
fn scratch_size(widths: [Option<u32>; LANES]) -> Result<usize, Status> {
    let mut live = widths.iter().flatten();
    let first = *live.next().ok_or(Status::NullOperand)?;
    if live.any(|bits| *bits != first) {
        return Err(Status::BadArgument);
    }
    Ok(LANES * limb_bytes(first) * SCRATCH_WORDS_PER_LANE)
}

fn write_result(io: &mut LaneIo<'_>, value: BigUint) -> Status {
    match io.output.set(value) {
        Ok(()) => Status::NoError,
        Err(_) => Status::SizeError,
    }
}

fn encrypt_lane(io: &mut LaneIo<'_>, state: &SoftPublicKeyState) -> Status {
    let Some(key) = state.key.as_ref() else {
        return Status::ContextMismatch;
    };
    if io.input.value() >= &key.n {
        return Status::OutOfRange;
    }
    let result = io.input.value().modpow(&key.e, &key.n);
    write_result(io, result)
}

fn decrypt_lane(io: &mut LaneIo<'_>, state: &SoftPrivateKeyState) -> Status {
    let Some(loaded) = state.loaded.as_ref() else {
        return Status::ContextMismatch;
    };
    let c = io.input.value();
    if c >= &loaded.n {
        return Status::OutOfRange;
    }
    let result = match &loaded.key {
        PrivateKey::Type1 { n, d } => c.modpow(d, n),
        PrivateKey::Type2 { p, q, dp, dq, qinv } => {
            // Garner recombination: m = m2 + q * (qInv * (m1 - m2) mod p)
            let m1 = (c % p).modpow(dp, p);
            let m2 = (c % q).modpow(dq, q);
            let diff = (&m1 + p - (&m2 % p)) % p;
            let h = (qinv * diff) % p;
            m2 + h * q
        }
    };
    write_result(io, result)
}

impl MultiBufferBackend for SoftwareBackend {
    type PublicKeyState = SoftPublicKeyState;
    type PrivateKeyState = SoftPrivateKeyState;

    fn name(&self) -> &'static str {
        "software"
    }

    fn public_key_state_size(&self, bits_n: u32, bits_e: u32) -> Result<usize, Status> {
        if bits_n == 0 || bits_e == 0 || bits_e > bits_n {
            return Err(Status::BadArgument);
        }
        Ok(STATE_HEADER_BYTES + limb_bytes(bits_n) + limb_bytes(bits_e))
    }

    fn init_public_key_state(
        &self,
        bits_n: u32,
        bits_e: u32,
        size: usize,
    ) -> Result<SoftPublicKeyState, Status> {
        if size < self.public_key_state_size(bits_n, bits_e)? {
            return Err(Status::SizeError);
        }
        Ok(SoftPublicKeyState {
            bits_n,
            bits_e,
            key: None,
        })
    }

    fn set_public_key(
        &self,
        key: &PublicKey,
        state: &mut SoftPublicKeyState,
    ) -> Result<(), Status> {
        if key.bits_n() > state.bits_n || key.bits_e() > state.bits_e {
            return Err(Status::SizeError);
        }
        if key.n.is_even() {
            return Err(Status::BadArgument);
        }
        state.key = Some(key.clone());
        Ok(())
    }

    fn private_key_state_size(
        &self,
        variant: PrivateKeyVariant,
        bits_n: u32,
        bits_d: u32,
    ) -> Result<usize, Status> {
        if bits_n == 0 || bits_d == 0 || bits_d > bits_n {
            return Err(Status::BadArgument);
        }
        let body = match variant {
            PrivateKeyVariant::Type1 => limb_bytes(bits_n) + limb_bytes(bits_d),
            // p, q, dP, dQ, qInv, each bounded by the factor width
            PrivateKeyVariant::Type2 => 5 * limb_bytes(bits_d),
        };
        Ok(STATE_HEADER_BYTES + body)
    }

    fn init_private_key_state(
        &self,
        variant: PrivateKeyVariant,
        bits_n: u32,
        bits_d: u32,
        size: usize,
    ) -> Result<SoftPrivateKeyState, Status> {
        if size < self.private_key_state_size(variant, bits_n, bits_d)? {
            return Err(Status::SizeError);
        }
        Ok(SoftPrivateKeyState {
            variant,
            bits_n,
            bits_d,
            loaded: None,
        })
    }

    fn set_private_key(
        &self,
        key: &PrivateKey,
        state: &mut SoftPrivateKeyState,
    ) -> Result<(), Status> {
        if key.variant() != state.variant {
            return Err(Status::ContextMismatch);
        }
        let n = key.modulus();
        if n.bits() > u64::from(state.bits_n) || key.bits_d() > state.bits_d {
            return Err(Status::SizeError);
        }
        if n.is_even() {
            return Err(Status::BadArgument);
        }
        state.loaded = Some(LoadedPrivateKey {
            key: key.clone(),
            n,
        });
        Ok(())
    }

    fn private_key_variant(&self, state: &SoftPrivateKeyState) -> PrivateKeyVariant {
        state.variant
    }

    fn public_buffer_size(
        &self,
        keys: &[Option<&SoftPublicKeyState>; LANES],
    ) -> Result<usize, Status> {
        scratch_size(keys.map(|k| k.map(|s| s.bits_n)))
    }

    fn private_buffer_size(
        &self,
        keys: &[Option<&SoftPrivateKeyState>; LANES],
    ) -> Result<usize, Status> {
        let mut variants = keys.iter().flatten().map(|s| s.variant);
        if let Some(first) = variants.next() {
            if variants.any(|v| v != first) {
                return Err(Status::BadArgument);
            }
        }
        scratch_size(keys.map(|k| k.map(|s| s.bits_n)))
    }

    fn encrypt(
        &self,
        lanes: &mut [Option<LaneIo<'_>>; LANES],
        keys: &[Option<&SoftPublicKeyState>; LANES],
        scratch: &mut [u8],
    ) -> BatchStatus {
        let required = match self.public_buffer_size(keys) {
            Ok(size) => size,
            Err(status) => return BatchStatus::rejected(status),
        };
        if scratch.len() < required {
            return BatchStatus::rejected(Status::SizeError);
        }

        let mut statuses = [Status::NullOperand; LANES];
        for (lane, (io, key)) in lanes.iter_mut().zip(keys.iter()).enumerate() {
            if let (Some(io), Some(state)) = (io.as_mut(), key) {
                statuses[lane] = encrypt_lane(io, state);
            }
        }
        scratch[..required].fill(0);

        let batch = BatchStatus::from_lanes(statuses);
        trace!(aggregate = %batch.aggregate, "software encrypt");
        batch
    }

    fn decrypt(
        &self,
        lanes: &mut [Option<LaneIo<'_>>; LANES],
        keys: &[Option<&SoftPrivateKeyState>; LANES],
        scratch: &mut [u8],
    ) -> BatchStatus {
        let required = match self.private_buffer_size(keys) {
            Ok(size) => size,
            Err(status) => return BatchStatus::rejected(status),
        };
        if scratch.len() < required {
            return BatchStatus::rejected(Status::SizeError);
        }

        let mut statuses = [Status::NullOperand; LANES];
        for (lane, (io, key)) in lanes.iter_mut().zip(keys.iter()).enumerate() {
            if let (Some(io), Some(state)) = (io.as_mut(), key) {
                statuses[lane] = decrypt_lane(io, state);
            }
        }
        scratch[..required].fill(0);

        let batch = BatchStatus::from_lanes(statuses);
        trace!(aggregate = %batch.aggregate, "software decrypt");
        batch
    }
}
