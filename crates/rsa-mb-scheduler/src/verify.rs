//! Cross-checks batched results against an independent oracle

use num_bigint::BigUint;
use rsa_mb_core::{ModPowOracle, Outcome, PrivateKey, Request, RequestId, Stage};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Requests with at least one completed stage
    pub checked: usize,
    /// Ids of requests whose results disagree with the oracle
    pub mismatches: Vec<RequestId>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

fn completed(request: &Request, stage: Stage) -> bool {
    request.outcome(stage) == Outcome::Completed
}

/// ciphertext == plaintext^E mod N
fn ciphertext_matches<O: ModPowOracle>(oracle: &O, request: &Request) -> bool {
    let Some(key) = request.public_key() else {
        return false;
    };
    let expected = oracle.mod_pow(request.plaintext().value(), &key.e, &key.n);
    request.ciphertext().value() == &expected
}

/// decrypted == ciphertext^D mod N, checked per prime for the CRT form
fn decrypted_matches<O: ModPowOracle>(oracle: &O, request: &Request) -> bool {
    let ciphertext = request.ciphertext().value();
    let decrypted = request.decrypted().value();
    let Some(key) = request.private_key() else {
        return false;
    };
    match key {
        PrivateKey::Type1 { n, d } => decrypted == &oracle.mod_pow(ciphertext, d, n),
        PrivateKey::Type2 { p, q, dp, dq, .. } => {
            let residue = |prime: &BigUint, exponent: &BigUint| {
                decrypted % prime == oracle.mod_pow(&(ciphertext % prime), exponent, prime)
            };
            decrypted < &key.modulus() && residue(p, dp) && residue(q, dq)
        }
    }
}

/// Check one request; `None` when no stage completed
pub fn verify_request<O: ModPowOracle>(oracle: &O, request: &Request) -> Option<bool> {
    let encrypted = completed(request, Stage::Encrypt);
    let decrypted = completed(request, Stage::Decrypt);
    if !encrypted && !decrypted {
        return None;
    }

    let mut ok = true;
    if encrypted {
        ok &= ciphertext_matches(oracle, request);
    }
    if decrypted {
        ok &= decrypted_matches(oracle, request);
    }
    if encrypted && decrypted {
        ok &= request.decrypted().value() == request.plaintext().value();
    }
    Some(ok)
}

/// Check every request that completed at least one stage
pub fn verify_requests<O: ModPowOracle>(oracle: &O, requests: &[Request]) -> VerifyReport {
    let mut report = VerifyReport::default();
    for request in requests {
        match verify_request(oracle, request) {
            Some(true) => report.checked += 1,
            Some(false) => {
                report.checked += 1;
                report.mismatches.push(request.id());
                warn!(request = request.id(), "Result disagrees with oracle");
            }
            None => {}
        }
    }
    report
}
