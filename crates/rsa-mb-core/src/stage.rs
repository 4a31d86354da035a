//! Pipeline stage identifier

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a batched RSA operation
///
/// Encryption and decryption are independent stages: each runs its own
/// batcher over the same request list, and a request excluded from one
/// stage is never retried in a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Public-key operation: ciphertext = plaintext^E mod N
    Encrypt,
    /// Private-key operation: decrypted = ciphertext^D mod N
    Decrypt,
}

impl Stage {
    /// Position of this stage in per-request outcome arrays
    pub fn index(&self) -> usize {
        match self {
            Stage::Encrypt => 0,
            Stage::Decrypt => 1,
        }
    }

    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Encrypt => "encrypt",
            Stage::Decrypt => "decrypt",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Encrypt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serialization() {
        assert_eq!(serde_json::to_string(&Stage::Encrypt).unwrap(), "\"encrypt\"");
        assert_eq!(serde_json::from_str::<Stage>("\"decrypt\"").unwrap(), Stage::Decrypt);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Encrypt.to_string(), "encrypt");
        assert_eq!(Stage::Decrypt.to_string(), "decrypt");
    }

    #[test]
    fn test_stage_indices_are_distinct() {
        assert_ne!(Stage::Encrypt.index(), Stage::Decrypt.index());
    }
}
