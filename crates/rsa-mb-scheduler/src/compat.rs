//! Batch admission predicates
//!
//! A request is compared with the last admitted lane of the current batch
//! and, when that is not the request right before it in the stream, with
//! its stream predecessor too. A batch is homogeneous by construction as
//! long as compatibility is transitive, which holds for the equality
//! checks below.

use rsa_mb_core::{PrivateKeyVariant, Request};

/// Same public exponent and same modulus width
pub fn encryption_compatible(prev: &Request, next: &Request) -> bool {
    match (prev.value_e(), next.value_e()) {
        (Some(prev_e), Some(next_e)) => prev_e == next_e && prev.bits_n() == next.bits_n(),
        _ => false,
    }
}

/// Same modulus width and same materialized key representation
pub fn decryption_compatible(
    prev: &Request,
    prev_variant: PrivateKeyVariant,
    next: &Request,
    next_variant: PrivateKeyVariant,
) -> bool {
    prev.bits_n() == next.bits_n() && prev_variant == next_variant
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use rsa_mb_core::fixtures;

    fn encrypt_request(id: u64, key: &rsa_mb_core::KeyConfig) -> Request {
        Request::encrypt_only(id, BigUint::from(2u32), key.public_key().unwrap()).unwrap()
    }

    fn decrypt_request(
        id: u64,
        key: &rsa_mb_core::KeyConfig,
        variant: PrivateKeyVariant,
    ) -> Request {
        let private_key = key.private_key(variant).unwrap();
        Request::decrypt_only(id, BigUint::from(2u32), private_key).unwrap()
    }

    #[test]
    fn test_encryption_same_key_shape() {
        let a = encrypt_request(0, &fixtures::reference_1024());
        let b = encrypt_request(1, &fixtures::crt_1024());
        assert!(encryption_compatible(&a, &b));
    }

    #[test]
    fn test_encryption_exponent_mismatch() {
        let a = encrypt_request(0, &fixtures::crt_1024());
        let b = encrypt_request(1, &fixtures::crt_1024_e17());
        assert!(!encryption_compatible(&a, &b));
    }

    #[test]
    fn test_encryption_width_mismatch() {
        let a = encrypt_request(0, &fixtures::crt_1024());
        let b = encrypt_request(1, &fixtures::crt_512());
        assert!(!encryption_compatible(&a, &b));
        assert!(!encryption_compatible(&b, &a));
    }

    #[test]
    fn test_encryption_requires_public_keys() {
        let a = encrypt_request(0, &fixtures::crt_1024());
        let b = decrypt_request(1, &fixtures::crt_1024(), PrivateKeyVariant::Type1);
        assert!(!encryption_compatible(&a, &b));
    }

    #[test]
    fn test_decryption_variant_mismatch() {
        let key = fixtures::crt_1024();
        let a = decrypt_request(0, &key, PrivateKeyVariant::Type1);
        let b = decrypt_request(1, &key, PrivateKeyVariant::Type2);
        assert!(decryption_compatible(&a, PrivateKeyVariant::Type1, &b, PrivateKeyVariant::Type1));
        assert!(!decryption_compatible(&a, PrivateKeyVariant::Type1, &b, PrivateKeyVariant::Type2));
    }

    #[test]
    fn test_decryption_width_mismatch() {
        let a = decrypt_request(0, &fixtures::crt_1024(), PrivateKeyVariant::Type2);
        let b = decrypt_request(1, &fixtures::crt_512(), PrivateKeyVariant::Type2);
        assert!(!decryption_compatible(&a, PrivateKeyVariant::Type2, &b, PrivateKeyVariant::Type2));
    }
}
