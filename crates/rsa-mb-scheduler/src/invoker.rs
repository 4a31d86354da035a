//! Backend invocation: key-state materialization and batch dispatch
//!
//! `Direction` captures everything that differs between the encryption and
//! decryption passes, so the batcher is written once for both.

use rsa_mb_core::{
    BatchStatus, LaneIo, MultiBufferBackend, PrivateKey, PublicKey, Request, Stage, Status, LANES,
};

use crate::compat::{decryption_compatible, encryption_compatible};
use crate::lanes::LaneArray;

/// Result of offering a request to the current batch
#[derive(Debug)]
pub enum Admission<K> {
    /// Compatible; the key state is ready for its lane
    Admitted(K),
    /// Incompatible with the last admitted request or the stream predecessor
    Incompatible,
    /// The backend refused to materialize the key state
    Failed(Status),
}

/// One pass over the request stream
pub trait Direction<B: MultiBufferBackend> {
    /// Key state materialized per lane
    type KeyState;

    const STAGE: Stage;

    /// Check `next` against the last admitted lane and materialize its key
    ///
    /// `prev` is `None` for the first lane of a batch, which is admitted
    /// without a compatibility check.
    fn admit(
        backend: &B,
        prev: Option<(&Request, &Self::KeyState)>,
        next: &Request,
    ) -> Admission<Self::KeyState>;

    /// Check `next` against a stream predecessor that holds no lane
    ///
    /// Used when the request right before `next` was not admitted; only
    /// the request itself is available for the comparison.
    fn requests_compatible(prev: &Request, next: &Request) -> bool;

    /// Scratch bytes the backend needs for this lane array
    fn buffer_size(backend: &B, keys: &[Option<&Self::KeyState>; LANES]) -> Result<usize, Status>;

    fn execute(
        backend: &B,
        lanes: &mut [Option<LaneIo<'_>>; LANES],
        keys: &[Option<&Self::KeyState>; LANES],
        scratch: &mut [u8],
    ) -> BatchStatus;
}

/// Encryption pass: plaintext -> ciphertext under {N, E}
#[derive(Debug, Clone, Copy, Default)]
pub struct Encrypt;

/// Decryption pass: ciphertext -> decrypted under the private key
#[derive(Debug, Clone, Copy, Default)]
pub struct Decrypt;

/// Size, initialize and load a public key state
pub fn materialize_public<B: MultiBufferBackend>(
    backend: &B,
    key: &PublicKey,
) -> Result<B::PublicKeyState, Status> {
    let (bits_n, bits_e) = (key.bits_n(), key.bits_e());
    let size = backend.public_key_state_size(bits_n, bits_e)?;
    let mut state = backend.init_public_key_state(bits_n, bits_e, size)?;
    backend.set_public_key(key, &mut state)?;
    Ok(state)
}

/// Size, initialize and load a private key state in the key's own variant
pub fn materialize_private<B: MultiBufferBackend>(
    backend: &B,
    key: &PrivateKey,
) -> Result<B::PrivateKeyState, Status> {
    let (variant, bits_n, bits_d) = (key.variant(), key.bits_n(), key.bits_d());
    let size = backend.private_key_state_size(variant, bits_n, bits_d)?;
    let mut state = backend.init_private_key_state(variant, bits_n, bits_d, size)?;
    backend.set_private_key(key, &mut state)?;
    Ok(state)
}

impl<B: MultiBufferBackend> Direction<B> for Encrypt {
    type KeyState = B::PublicKeyState;

    const STAGE: Stage = Stage::Encrypt;

    fn admit(
        backend: &B,
        prev: Option<(&Request, &Self::KeyState)>,
        next: &Request,
    ) -> Admission<Self::KeyState> {
        if let Some((prev, _)) = prev {
            if !encryption_compatible(prev, next) {
                return Admission::Incompatible;
            }
        }
        let Some(key) = next.public_key() else {
            return Admission::Failed(Status::NullOperand);
        };
        match materialize_public(backend, key) {
            Ok(state) => Admission::Admitted(state),
            Err(status) => Admission::Failed(status),
        }
    }

    fn requests_compatible(prev: &Request, next: &Request) -> bool {
        encryption_compatible(prev, next)
    }

    fn buffer_size(backend: &B, keys: &[Option<&Self::KeyState>; LANES]) -> Result<usize, Status> {
        backend.public_buffer_size(keys)
    }

    fn execute(
        backend: &B,
        lanes: &mut [Option<LaneIo<'_>>; LANES],
        keys: &[Option<&Self::KeyState>; LANES],
        scratch: &mut [u8],
    ) -> BatchStatus {
        backend.encrypt(lanes, keys, scratch)
    }
}

impl<B: MultiBufferBackend> Direction<B> for Decrypt {
    type KeyState = B::PrivateKeyState;

    const STAGE: Stage = Stage::Decrypt;

    // The variant is a property of the materialized state, so the key is
    // loaded before the compatibility check.
    fn admit(
        backend: &B,
        prev: Option<(&Request, &Self::KeyState)>,
        next: &Request,
    ) -> Admission<Self::KeyState> {
        let Some(key) = next.private_key() else {
            return Admission::Failed(Status::NullOperand);
        };
        let state = match materialize_private(backend, key) {
            Ok(state) => state,
            Err(status) => return Admission::Failed(status),
        };
        if let Some((prev, prev_state)) = prev {
            let prev_variant = backend.private_key_variant(prev_state);
            let next_variant = backend.private_key_variant(&state);
            if !decryption_compatible(prev, prev_variant, next, next_variant) {
                return Admission::Incompatible;
            }
        }
        Admission::Admitted(state)
    }

    // No key state to ask, so the variant comes from the key itself.
    fn requests_compatible(prev: &Request, next: &Request) -> bool {
        match (prev.private_key(), next.private_key()) {
            (Some(prev_key), Some(next_key)) => {
                decryption_compatible(prev, prev_key.variant(), next, next_key.variant())
            }
            _ => false,
        }
    }

    fn buffer_size(backend: &B, keys: &[Option<&Self::KeyState>; LANES]) -> Result<usize, Status> {
        backend.private_buffer_size(keys)
    }

    fn execute(
        backend: &B,
        lanes: &mut [Option<LaneIo<'_>>; LANES],
        keys: &[Option<&Self::KeyState>; LANES],
        scratch: &mut [u8],
    ) -> BatchStatus {
        backend.decrypt(lanes, keys, scratch)
    }
}

/// Scratch memory for one batched call, zeroed before release
#[derive(Debug)]
pub struct ScratchBuffer(Vec<u8>);

impl ScratchBuffer {
    pub fn new(size: usize) -> Self {
        Self(vec![0u8; size])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl Drop for ScratchBuffer {
    fn drop(&mut self) {
        self.0.fill(0);
    }
}

/// Borrow the requests behind each lane mutably, all at once
///
/// Live lanes must reference strictly increasing request indices, which
/// holds for lanes filled in stream order. A lane whose index cannot be
/// found stays `None` and is seen by the backend as padding.
fn lane_requests<'r>(
    requests: &'r mut [Request],
    indices: &[Option<usize>; LANES],
) -> [Option<&'r mut Request>; LANES] {
    let mut lanes: [Option<&'r mut Request>; LANES] = std::array::from_fn(|_| None);
    let mut remaining = requests.iter_mut().enumerate();
    for (lane, index) in indices.iter().enumerate() {
        if let Some(index) = index {
            lanes[lane] = remaining
                .find(|(candidate, _)| candidate == index)
                .map(|(_, request)| request);
        }
    }
    lanes
}

/// Query the scratch size, allocate it, and run one batched call
///
/// An `Err` carries the status of a failed size query; the batched call is
/// not attempted in that case. Scratch memory is released before returning
/// on every path.
pub fn dispatch<B, D>(
    backend: &B,
    lanes: &LaneArray<D::KeyState>,
    requests: &mut [Request],
) -> Result<BatchStatus, Status>
where
    B: MultiBufferBackend,
    D: Direction<B>,
{
    let keys = lanes.key_refs();
    let size = D::buffer_size(backend, &keys)?;
    let mut scratch = ScratchBuffer::new(size);

    let mut io = lane_requests(requests, &lanes.request_indices())
        .map(|request| request.and_then(|request| request.lane_io(D::STAGE)));

    Ok(D::execute(backend, &mut io, &keys, scratch.as_mut_slice()))
}
