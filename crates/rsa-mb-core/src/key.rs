//! RSA key material
//!
//! Keys are already-materialized numeric values. Padding schemes, key
//! derivation and key generation are outside this crate.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Public key {N, E}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub n: BigUint,
    pub e: BigUint,
}

impl PublicKey {
    pub fn new(n: BigUint, e: BigUint) -> Result<Self> {
        if n <= BigUint::one() {
            return Err(Error::InvalidKey("modulus must be greater than 1".into()));
        }
        if e.is_zero() {
            return Err(Error::InvalidKey("public exponent must be non-zero".into()));
        }
        Ok(Self { n, e })
    }

    pub fn bits_n(&self) -> u32 {
        self.n.bits() as u32
    }

    pub fn bits_e(&self) -> u32 {
        self.e.bits() as u32
    }
}

/// Private key representation tag
///
/// Both forms compute the same function, but a backend batch must not mix
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivateKeyVariant {
    /// Modulus and private exponent {N, D}
    Type1,
    /// CRT form {P, Q, dP, dQ, qInv}
    Type2,
}

impl fmt::Display for PrivateKeyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrivateKeyVariant::Type1 => write!(f, "type1"),
            PrivateKeyVariant::Type2 => write!(f, "type2"),
        }
    }
}

impl Default for PrivateKeyVariant {
    fn default() -> Self {
        PrivateKeyVariant::Type1
    }
}

/// Private key in one of its representations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivateKey {
    Type1 {
        n: BigUint,
        d: BigUint,
    },
    Type2 {
        p: BigUint,
        q: BigUint,
        dp: BigUint,
        dq: BigUint,
        qinv: BigUint,
    },
}

impl PrivateKey {
    pub fn type1(n: BigUint, d: BigUint) -> Result<Self> {
        if n <= BigUint::one() {
            return Err(Error::InvalidKey("modulus must be greater than 1".into()));
        }
        if d.is_zero() {
            return Err(Error::InvalidKey("private exponent must be non-zero".into()));
        }
        Ok(PrivateKey::Type1 { n, d })
    }

    pub fn type2(p: BigUint, q: BigUint, dp: BigUint, dq: BigUint, qinv: BigUint) -> Result<Self> {
        if p <= BigUint::one() || q <= BigUint::one() {
            return Err(Error::InvalidKey("prime factors must be greater than 1".into()));
        }
        if p == q {
            return Err(Error::InvalidKey("prime factors must differ".into()));
        }
        Ok(PrivateKey::Type2 { p, q, dp, dq, qinv })
    }

    pub fn variant(&self) -> PrivateKeyVariant {
        match self {
            PrivateKey::Type1 { .. } => PrivateKeyVariant::Type1,
            PrivateKey::Type2 { .. } => PrivateKeyVariant::Type2,
        }
    }

    /// The modulus N (P*Q for the CRT form)
    pub fn modulus(&self) -> BigUint {
        match self {
            PrivateKey::Type1 { n, .. } => n.clone(),
            PrivateKey::Type2 { p, q, .. } => p * q,
        }
    }

    pub fn bits_n(&self) -> u32 {
        self.modulus().bits() as u32
    }

    /// Exponent width used to size a key state
    ///
    /// For the CRT form this is the width of the larger prime factor, which
    /// bounds both dP and dQ.
    pub fn bits_d(&self) -> u32 {
        match self {
            PrivateKey::Type1 { d, .. } => d.bits() as u32,
            PrivateKey::Type2 { p, q, .. } => p.bits().max(q.bits()) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_rejects_degenerate_values() {
        assert!(PublicKey::new(BigUint::one(), BigUint::from(3u32)).is_err());
        assert!(PublicKey::new(BigUint::from(33u32), BigUint::zero()).is_err());
    }

    #[test]
    fn test_type2_modulus_is_product() {
        let key = PrivateKey::type2(
            BigUint::from(11u32),
            BigUint::from(3u32),
            BigUint::from(7u32),
            BigUint::from(1u32),
            BigUint::from(4u32),
        )
        .unwrap();
        assert_eq!(key.modulus(), BigUint::from(33u32));
        assert_eq!(key.bits_n(), 6);
        assert_eq!(key.bits_d(), 4);
        assert_eq!(key.variant(), PrivateKeyVariant::Type2);
    }

    #[test]
    fn test_variant_serialization() {
        assert_eq!(serde_json::to_string(&PrivateKeyVariant::Type2).unwrap(), "\"type2\"");
        assert_eq!(
            serde_json::from_str::<PrivateKeyVariant>("\"type1\"").unwrap(),
            PrivateKeyVariant::Type1
        );
    }
}
