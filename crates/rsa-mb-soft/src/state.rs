//! Key states of the software backend

use num_bigint::BigUint;
use rsa_mb_core::{PrivateKey, PrivateKeyVariant, PublicKey};

/// Fixed header of every key state (widths, variant tag, flags)
pub(crate) const STATE_HEADER_BYTES: usize = 64;

/// Bytes needed to store a `bits`-wide value as 64-bit limbs
pub(crate) fn limb_bytes(bits: u32) -> usize {
    (bits as usize).div_ceil(64) * 8
}

/// Materialized public key
#[derive(Debug)]
pub struct SoftPublicKeyState {
    pub(crate) bits_n: u32,
    pub(crate) bits_e: u32,
    pub(crate) key: Option<PublicKey>,
}

impl SoftPublicKeyState {
    pub fn is_set(&self) -> bool {
        self.key.is_some()
    }
}

/// Private key loaded into a state, with its modulus precomputed
#[derive(Debug)]
pub(crate) struct LoadedPrivateKey {
    pub(crate) key: PrivateKey,
    pub(crate) n: BigUint,
}

/// Materialized private key
#[derive(Debug)]
pub struct SoftPrivateKeyState {
    pub(crate) variant: PrivateKeyVariant,
    pub(crate) bits_n: u32,
    pub(crate) bits_d: u32,
    pub(crate) loaded: Option<LoadedPrivateKey>,
}

impl SoftPrivateKeyState {
    pub fn is_set(&self) -> bool {
        self.loaded.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limb_bytes_rounds_up() {
        assert_eq!(limb_bytes(1), 8);
        assert_eq!(limb_bytes(64), 8);
        assert_eq!(limb_bytes(65), 16);
        assert_eq!(limb_bytes(1024), 128);
    }
}
