//! Key and batch configuration
//!
//! Keys are passed explicitly to every pipeline; there is no process-wide
//! key constant.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::{Error, PrivateKey, PrivateKeyVariant, PublicKey, Result, LANES};

/// RSA key material as hex strings (JSON on disk)
///
/// ```json
/// { "n": "0x8035...", "e": "0x010001", "d": "0x7aab...", "crt": null }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConfig {
    /// Modulus N
    pub n: String,
    /// Public exponent E
    pub e: String,
    /// Private exponent D
    pub d: String,
    /// CRT components, required for `Type2` private keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crt: Option<CrtConfig>,
}

/// CRT components of a private key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrtConfig {
    pub p: String,
    pub q: String,
    pub dp: String,
    pub dq: String,
    pub qinv: String,
}

/// Parse a big-endian hex string, with or without a `0x` prefix
pub(crate) fn parse_hex(field: &'static str, value: &str) -> Result<BigUint> {
    let digits = value
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    if digits.is_empty() {
        return Err(Error::InvalidHex {
            field,
            reason: "empty value".into(),
        });
    }
    let padded;
    let digits = if digits.len() % 2 == 1 {
        padded = format!("0{}", digits);
        padded.as_str()
    } else {
        digits
    };
    let bytes = hex::decode(digits).map_err(|e| Error::InvalidHex {
        field,
        reason: e.to_string(),
    })?;
    Ok(BigUint::from_bytes_be(&bytes))
}

impl KeyConfig {
    /// Key from hex strings, without CRT components
    pub fn new(n: impl Into<String>, e: impl Into<String>, d: impl Into<String>) -> Self {
        Self {
            n: n.into(),
            e: e.into(),
            d: d.into(),
            crt: None,
        }
    }

    /// Attach CRT components
    pub fn with_crt(mut self, crt: CrtConfig) -> Self {
        self.crt = Some(crt);
        self
    }

    /// The 1024-bit reference key (E = 65537)
    pub fn reference_1024() -> Self {
        crate::fixtures::reference_1024()
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    pub fn modulus(&self) -> Result<BigUint> {
        parse_hex("n", &self.n)
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::new(parse_hex("n", &self.n)?, parse_hex("e", &self.e)?)
    }

    /// Private key in the requested representation
    ///
    /// `Type2` needs the CRT components and checks that P*Q matches N.
    pub fn private_key(&self, variant: PrivateKeyVariant) -> Result<PrivateKey> {
        match variant {
            PrivateKeyVariant::Type1 => {
                PrivateKey::type1(parse_hex("n", &self.n)?, parse_hex("d", &self.d)?)
            }
            PrivateKeyVariant::Type2 => {
                let crt = self.crt.as_ref().ok_or(Error::MissingKeyComponent("crt"))?;
                let key = PrivateKey::type2(
                    parse_hex("p", &crt.p)?,
                    parse_hex("q", &crt.q)?,
                    parse_hex("dp", &crt.dp)?,
                    parse_hex("dq", &crt.dq)?,
                    parse_hex("qinv", &crt.qinv)?,
                )?;
                if key.modulus() != self.modulus()? {
                    return Err(Error::InvalidKey("P*Q does not match N".into()));
                }
                Ok(key)
            }
        }
    }
}

fn default_lanes() -> usize {
    LANES
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Backend SIMD width; must equal `LANES`
    #[serde(default = "default_lanes")]
    pub lanes: usize,
    /// Cross-check results against the oracle after the decrypt stage
    #[serde(default)]
    pub verify: bool,
    /// Representation used when building private keys from a `KeyConfig`
    #[serde(default)]
    pub private_key_variant: PrivateKeyVariant,
}

impl BatchConfig {
    /// Enable oracle verification
    pub fn with_verify(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    /// Select the private key representation
    pub fn with_private_key_variant(mut self, variant: PrivateKeyVariant) -> Self {
        self.private_key_variant = variant;
        self
    }

    /// Check the configured width against the compiled lane count
    pub fn validate(&self) -> Result<()> {
        if self.lanes != LANES {
            return Err(Error::LaneCountMismatch {
                expected: LANES,
                actual: self.lanes,
            });
        }
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            lanes: LANES,
            verify: false,
            private_key_variant: PrivateKeyVariant::Type1,
        }
    }
}
