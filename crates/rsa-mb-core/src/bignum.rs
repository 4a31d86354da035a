//! Fixed-capacity big integer holder

use num_bigint::BigUint;
use num_traits::Zero;

use crate::{Error, Result};

/// Big integer buffer sized to a modulus bit width
///
/// Every operand and result slot of a request is one of these. The capacity
/// is fixed when the request is created; writes that would not fit are
/// rejected instead of growing the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigNum {
    value: BigUint,
    capacity_bits: u32,
}

impl BigNum {
    /// Create a zeroed buffer able to hold `capacity_bits` bits
    pub fn with_capacity(capacity_bits: u32) -> Self {
        Self {
            value: BigUint::zero(),
            capacity_bits,
        }
    }

    /// Create a buffer holding `value`
    pub fn from_value(value: BigUint, capacity_bits: u32) -> Result<Self> {
        let mut num = Self::with_capacity(capacity_bits);
        num.set(value)?;
        Ok(num)
    }

    /// Overwrite the held value in place
    pub fn set(&mut self, value: BigUint) -> Result<()> {
        if value.bits() > u64::from(self.capacity_bits) {
            return Err(Error::CapacityExceeded {
                bits: value.bits(),
                capacity: self.capacity_bits,
            });
        }
        self.value = value;
        Ok(())
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn capacity_bits(&self) -> u32 {
        self.capacity_bits
    }

    /// Significant bits of the held value
    pub fn bits(&self) -> u64 {
        self.value.bits()
    }
}
