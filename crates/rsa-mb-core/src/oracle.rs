//! Independent modular exponentiation used to cross-check batch output

use num_bigint::BigUint;

/// Arbitrary-precision arithmetic capability
///
/// Kept behind a trait so verification can run against any big-integer
/// library, or a mock.
pub trait ModPowOracle {
    /// base^exponent mod modulus
    fn mod_pow(&self, base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint;
}

/// Oracle backed by `num-bigint`
#[derive(Debug, Clone, Copy, Default)]
pub struct NumBigintOracle;

impl ModPowOracle for NumBigintOracle {
    fn mod_pow(&self, base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
        base.modpow(exponent, modulus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_mod_pow() {
        let oracle = NumBigintOracle;
        let r = oracle.mod_pow(&BigUint::from(4u32), &BigUint::from(13u32), &BigUint::from(497u32));
        assert_eq!(r, BigUint::from(445u32));
    }
}
