//! Multi-buffer backend contract
//!
//! A backend evaluates `LANES` independent modular exponentiations per call.
//! Every per-lane array passed to it has exactly `LANES` entries; `None`
//! marks a padding lane, which the backend must tolerate and answer with
//! `Status::NullOperand`.

use crate::{BatchStatus, BigNum, PrivateKey, PrivateKeyVariant, PublicKey, Status, LANES};

/// Input and output buffers of one live lane
///
/// Both borrow from the same request; the output is overwritten in place.
#[derive(Debug)]
pub struct LaneIo<'a> {
    pub input: &'a BigNum,
    pub output: &'a mut BigNum,
}

/// Vectorized RSA engine
///
/// Key states are materialized per request and per batch through the
/// `*_size` / `init_*` / `set_*` sequence, and dropped by the caller once the
/// batch completes.
pub trait MultiBufferBackend {
    /// Materialized {N, E}
    type PublicKeyState;

    /// Materialized private key in one representation variant
    type PrivateKeyState;

    /// Name of this backend (for logging)
    fn name(&self) -> &'static str;

    // === Public key states ===

    /// Bytes of key-state storage needed for the given widths
    fn public_key_state_size(&self, bits_n: u32, bits_e: u32) -> Result<usize, Status>;

    /// Allocate an empty public key state of `size` bytes
    fn init_public_key_state(
        &self,
        bits_n: u32,
        bits_e: u32,
        size: usize,
    ) -> Result<Self::PublicKeyState, Status>;

    /// Load key values into an initialized state
    fn set_public_key(
        &self,
        key: &PublicKey,
        state: &mut Self::PublicKeyState,
    ) -> Result<(), Status>;

    // === Private key states ===

    /// Bytes of key-state storage needed for a private key
    ///
    /// `bits_d` is the private exponent width for `Type1` keys and the
    /// larger prime factor width for `Type2` keys.
    fn private_key_state_size(
        &self,
        variant: PrivateKeyVariant,
        bits_n: u32,
        bits_d: u32,
    ) -> Result<usize, Status>;

    /// Allocate an empty private key state of `size` bytes
    fn init_private_key_state(
        &self,
        variant: PrivateKeyVariant,
        bits_n: u32,
        bits_d: u32,
        size: usize,
    ) -> Result<Self::PrivateKeyState, Status>;

    /// Load key values into an initialized state
    fn set_private_key(
        &self,
        key: &PrivateKey,
        state: &mut Self::PrivateKeyState,
    ) -> Result<(), Status>;

    /// Representation variant of a materialized private key
    fn private_key_variant(&self, state: &Self::PrivateKeyState) -> PrivateKeyVariant;

    // === Batched operations ===

    /// Scratch bytes needed to encrypt with these key states
    fn public_buffer_size(
        &self,
        keys: &[Option<&Self::PublicKeyState>; LANES],
    ) -> Result<usize, Status>;

    /// Scratch bytes needed to decrypt with these key states
    fn private_buffer_size(
        &self,
        keys: &[Option<&Self::PrivateKeyState>; LANES],
    ) -> Result<usize, Status>;

    /// Encrypt every live lane: output = input^E mod N
    fn encrypt(
        &self,
        lanes: &mut [Option<LaneIo<'_>>; LANES],
        keys: &[Option<&Self::PublicKeyState>; LANES],
        scratch: &mut [u8],
    ) -> BatchStatus;

    /// Decrypt every live lane: output = input^D mod N
    fn decrypt(
        &self,
        lanes: &mut [Option<LaneIo<'_>>; LANES],
        keys: &[Option<&Self::PrivateKeyState>; LANES],
        scratch: &mut [u8],
    ) -> BatchStatus;
}
