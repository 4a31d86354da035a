//! Batched modular exponentiation on the private-key path
//!
//! Each (base, exponent, modulus) triple is treated as a decryption with a
//! Type1 key {N = modulus, D = exponent}, so any backend can serve generic
//! modexp workloads `LANES` at a time.

use num_bigint::BigUint;
use rsa_mb_core::{MultiBufferBackend, Outcome, PrivateKey, Request, Stage};

use crate::error::Result;
use crate::stage::decrypt_stage;

/// `base^exponent mod modulus` for every triple, in input order
///
/// Triples whose modulus width differs from the previously admitted one,
/// or from the triple right before them, are excluded from their batch and
/// yield `None`. Exponents must be
/// non-zero and no wider than their modulus; what the backend rejects
/// beyond that (for example even moduli) aborts the whole call.
pub fn batch_mod_pow<B: MultiBufferBackend>(
    backend: &B,
    operands: &[(BigUint, BigUint, BigUint)],
) -> Result<Vec<Option<BigUint>>> {
    let mut requests = Vec::with_capacity(operands.len());
    for (id, (base, exponent, modulus)) in (0u64..).zip(operands) {
        let key = PrivateKey::type1(modulus.clone(), exponent.clone())?;
        requests.push(Request::decrypt_only(id, base % modulus, key)?);
    }

    decrypt_stage(backend, &mut requests)?;

    Ok(requests
        .iter()
        .map(|request| match request.outcome(Stage::Decrypt) {
            Outcome::Completed => Some(request.decrypted().value().clone()),
            _ => None,
        })
        .collect())
}
