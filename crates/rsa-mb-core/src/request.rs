//! A single RSA operation queued for batching

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::{BigNum, Error, LaneIo, PrivateKey, PublicKey, Result, Stage};

/// Caller-chosen identifier used only for result attribution
pub type RequestId = u64;

/// What happened to a request in one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Not reached (the stage has not run, or aborted before this request)
    Pending,
    /// Not considered: no key for this stage, or excluded by an earlier stage
    Skipped,
    /// Rejected at batch admission; never attempted
    Excluded,
    /// Attempted, and the output buffer holds the result
    Completed,
    /// Attempted in a batch the backend rejected
    Failed,
}

/// One encryption and/or decryption job
///
/// Owns its operand and result buffers, each sized to the modulus width.
/// The input of a stage is written at construction (plaintext) or by the
/// previous stage (ciphertext); the batch that processes the request
/// overwrites the stage's output buffer in place.
#[derive(Debug, Clone)]
pub struct Request {
    id: RequestId,
    public_key: Option<PublicKey>,
    private_key: Option<PrivateKey>,
    bits_n: u32,
    plaintext: BigNum,
    ciphertext: BigNum,
    decrypted: BigNum,
    compatible: bool,
    outcomes: [Outcome; 2],
}

impl Request {
    /// Full round trip: encrypt `plaintext` with `public_key`, then decrypt
    /// the ciphertext with `private_key`
    pub fn new(
        id: RequestId,
        plaintext: BigUint,
        public_key: PublicKey,
        private_key: PrivateKey,
    ) -> Result<Self> {
        let public_bits = public_key.bits_n();
        let private_bits = private_key.bits_n();
        if public_key.n != private_key.modulus() {
            return Err(Error::ModulusMismatch {
                public_bits,
                private_bits,
            });
        }
        let mut request = Self::empty(id, public_bits, Some(public_key), Some(private_key));
        request.plaintext.set(plaintext)?;
        Ok(request)
    }

    /// Encryption only
    pub fn encrypt_only(id: RequestId, plaintext: BigUint, public_key: PublicKey) -> Result<Self> {
        let bits_n = public_key.bits_n();
        let mut request = Self::empty(id, bits_n, Some(public_key), None);
        request.plaintext.set(plaintext)?;
        Ok(request)
    }

    /// Decryption only, starting from an existing ciphertext
    pub fn decrypt_only(
        id: RequestId,
        ciphertext: BigUint,
        private_key: PrivateKey,
    ) -> Result<Self> {
        let bits_n = private_key.bits_n();
        let mut request = Self::empty(id, bits_n, None, Some(private_key));
        request.ciphertext.set(ciphertext)?;
        Ok(request)
    }

    fn empty(
        id: RequestId,
        bits_n: u32,
        public_key: Option<PublicKey>,
        private_key: Option<PrivateKey>,
    ) -> Self {
        Self {
            id,
            public_key,
            private_key,
            bits_n,
            plaintext: BigNum::with_capacity(bits_n),
            ciphertext: BigNum::with_capacity(bits_n),
            decrypted: BigNum::with_capacity(bits_n),
            compatible: true,
            outcomes: [Outcome::Pending; 2],
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    /// Public exponent, if this request can be encrypted
    pub fn value_e(&self) -> Option<&BigUint> {
        self.public_key.as_ref().map(|k| &k.e)
    }

    /// Modulus width in bits
    pub fn bits_n(&self) -> u32 {
        self.bits_n
    }

    pub fn plaintext(&self) -> &BigNum {
        &self.plaintext
    }

    pub fn ciphertext(&self) -> &BigNum {
        &self.ciphertext
    }

    pub fn decrypted(&self) -> &BigNum {
        &self.decrypted
    }

    /// Whether this request carries the key needed by `stage`
    pub fn supports(&self, stage: Stage) -> bool {
        match stage {
            Stage::Encrypt => self.public_key.is_some(),
            Stage::Decrypt => self.private_key.is_some(),
        }
    }

    pub fn is_compatible(&self) -> bool {
        self.compatible
    }

    /// Permanently exclude this request from further processing
    ///
    /// There is no way to re-enable a request.
    pub fn mark_incompatible(&mut self) {
        self.compatible = false;
    }

    pub fn outcome(&self, stage: Stage) -> Outcome {
        self.outcomes[stage.index()]
    }

    pub fn set_outcome(&mut self, stage: Stage, outcome: Outcome) {
        self.outcomes[stage.index()] = outcome;
    }

    /// Input and output buffers for `stage`, borrowed together
    ///
    /// Returns `None` when the request carries no key for the stage.
    pub fn lane_io(&mut self, stage: Stage) -> Option<LaneIo<'_>> {
        if !self.supports(stage) {
            return None;
        }
        let io = match stage {
            Stage::Encrypt => LaneIo {
                input: &self.plaintext,
                output: &mut self.ciphertext,
            },
            Stage::Decrypt => LaneIo {
                input: &self.ciphertext,
                output: &mut self.decrypted,
            },
        };
        Some(io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_round_trip_request_buffers_sized_to_modulus() {
        let key = fixtures::reference_1024();
        let request = Request::new(
            1,
            BigUint::from(12345u32),
            key.public_key().unwrap(),
            key.private_key(crate::PrivateKeyVariant::Type1).unwrap(),
        )
        .unwrap();

        assert_eq!(request.bits_n(), 1024);
        assert_eq!(request.ciphertext().capacity_bits(), 1024);
        assert_eq!(request.decrypted().capacity_bits(), 1024);
        assert!(request.is_compatible());
        assert_eq!(request.outcome(Stage::Encrypt), Outcome::Pending);
        assert_eq!(request.outcome(Stage::Decrypt), Outcome::Pending);
    }

    #[test]
    fn test_mismatched_moduli_rejected() {
        let a = fixtures::reference_1024();
        let b = fixtures::crt_1024();
        let err = Request::new(
            1,
            BigUint::from(2u32),
            a.public_key().unwrap(),
            b.private_key(crate::PrivateKeyVariant::Type1).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ModulusMismatch { .. }));
    }

    #[test]
    fn test_incompatibility_is_one_way() {
        let key = fixtures::crt_512();
        let mut request =
            Request::encrypt_only(7, BigUint::from(3u32), key.public_key().unwrap()).unwrap();
        request.mark_incompatible();
        assert!(!request.is_compatible());
        request.mark_incompatible();
        assert!(!request.is_compatible());
    }

    #[test]
    fn test_lane_io_follows_direction() {
        let key = fixtures::crt_512();
        let mut request =
            Request::encrypt_only(7, BigUint::from(3u32), key.public_key().unwrap()).unwrap();

        assert!(request.lane_io(Stage::Decrypt).is_none());

        let io = request.lane_io(Stage::Encrypt).unwrap();
        assert_eq!(io.input.value(), &BigUint::from(3u32));
        io.output.set(BigUint::from(27u32)).unwrap();
        assert_eq!(request.ciphertext().value(), &BigUint::from(27u32));
    }
}
