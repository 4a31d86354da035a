//! Error types for rsa-mb-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid hex in key field {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    #[error("Missing key component: {0}")]
    MissingKeyComponent(&'static str),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Value of {bits} bits exceeds buffer capacity of {capacity} bits")]
    CapacityExceeded { bits: u64, capacity: u32 },

    #[error(
        "Modulus mismatch: public key has {public_bits} bits, private key has {private_bits} bits"
    )]
    ModulusMismatch { public_bits: u32, private_bits: u32 },

    #[error("Lane count mismatch: expected {expected}, got {actual}")]
    LaneCountMismatch { expected: usize, actual: usize },
}
