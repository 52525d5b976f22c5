//! Key and nonce material for envelope encryption.
//!
//! All cryptographic material is handled as fixed-length byte buffers;
//! text encodings appear only at the wrapped-key ledger boundary, which
//! lives in `custody-grants`.

use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 256-bit symmetric content key for AES-256-GCM.
///
/// Generated fresh for every file and never reused across files, so
/// nonce uniqueness under a given key holds by construction. Exists only
/// in process memory between sealing and the last wrap for that file;
/// the raw bytes are wiped when the key is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; 32]);

impl SymmetricKey {
    /// Key length in bytes.
    pub const LEN: usize = 32;

    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; Self::LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        write!(f, "SymmetricKey(..)")
    }
}

/// A 96-bit nonce for AES-256-GCM, random per encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeNonce(pub [u8; 12]);

impl EnvelopeNonce {
    /// Nonce length in bytes.
    pub const LEN: usize = 12;

    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; Self::LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_random() {
        let k1 = SymmetricKey::generate();
        let k2 = SymmetricKey::generate();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_nonces_are_random() {
        let n1 = EnvelopeNonce::generate();
        let n2 = EnvelopeNonce::generate();
        assert_ne!(n1, n2);
    }

    #[test]
    fn test_key_debug_hides_material() {
        let key = SymmetricKey::from_bytes([0x42; 32]);
        let debug = format!("{:?}", key);
        assert!(!debug.contains("42"));
    }
}
