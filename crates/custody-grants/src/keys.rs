//! Recipient RSA key material.
//!
//! Public keys travel as PEM text through the ledger's identity
//! registry; private keys never leave the recipient. Key pairs are
//! 2048-bit RSA, the size the registry was provisioned with.

use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::{GrantError, Result};

/// RSA modulus size for recipient key pairs.
pub const RSA_BITS: usize = 2048;

/// Shortest string that could plausibly hold a PEM public key.
///
/// Registry entries below this are treated as missing, not parsed.
pub const MIN_PEM_LEN: usize = 64;

/// A recipient's public key, parsed from registry PEM text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientPublicKey(RsaPublicKey);

impl RecipientPublicKey {
    /// Parse from PEM text.
    ///
    /// Missing, empty, or too-short text is [`GrantError::RecipientKeyMissing`],
    /// raised before any cryptographic work.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let trimmed = pem.trim();
        if trimmed.len() < MIN_PEM_LEN {
            return Err(GrantError::RecipientKeyMissing(format!(
                "registry entry is {} characters",
                trimmed.len()
            )));
        }
        let key = RsaPublicKey::from_public_key_pem(trimmed)
            .map_err(|e| GrantError::InvalidRecipientKey(e.to_string()))?;
        Ok(Self(key))
    }

    /// Parse an optional registry entry, treating `None` as missing.
    pub fn from_registry(entry: Option<&str>) -> Result<Self> {
        match entry {
            None => Err(GrantError::RecipientKeyMissing(
                "no registry entry for recipient".to_string(),
            )),
            Some(pem) => Self::from_pem(pem),
        }
    }

    /// Encode as PEM text suitable for the identity registry.
    pub fn to_pem(&self) -> Result<String> {
        self.0
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| GrantError::KeyMaterial(e.to_string()))
    }

    pub(crate) fn inner(&self) -> &RsaPublicKey {
        &self.0
    }
}

/// A recipient's private key. Held in memory only for the duration of
/// an unwrap operation.
#[derive(Clone)]
pub struct RecipientPrivateKey(RsaPrivateKey);

impl std::fmt::Debug for RecipientPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print private key material
        write!(f, "RecipientPrivateKey(..)")
    }
}

impl RecipientPrivateKey {
    /// Generate a fresh 2048-bit key pair.
    pub fn generate() -> Result<Self> {
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), RSA_BITS)
            .map_err(|e| GrantError::KeyMaterial(e.to_string()))?;
        Ok(Self(key))
    }

    /// Parse from PKCS#8 PEM text.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem.trim())
            .map_err(|e| GrantError::KeyMaterial(e.to_string()))?;
        Ok(Self(key))
    }

    /// Encode as PKCS#8 PEM text.
    pub fn to_pem(&self) -> Result<String> {
        let pem = self
            .0
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| GrantError::KeyMaterial(e.to_string()))?;
        Ok(pem.to_string())
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> RecipientPublicKey {
        RecipientPublicKey(self.0.to_public_key())
    }

    pub(crate) fn inner(&self) -> &RsaPrivateKey {
        &self.0
    }
}
