//! The encrypted envelope and its wire format.
//!
//! One envelope is the self-contained encrypted form of one file: a
//! random 96-bit nonce, the 128-bit GCM tag, and the ciphertext. The
//! serialized layout is `nonce(12) ‖ tag(16) ‖ ciphertext` with no
//! header or version byte. The layout is a format contract shared with
//! every reader of the store and must stay bit-exact.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::crypto::{EnvelopeNonce, SymmetricKey};
use crate::error::{CoreError, Result};

/// Length of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Minimum length of a serialized envelope: nonce + tag, empty ciphertext.
pub const MIN_ENVELOPE_LEN: usize = EnvelopeNonce::LEN + TAG_LEN;

/// A sealed envelope. Immutable once created; never mutated after storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Nonce used for this encryption, unique per key by construction.
    pub nonce: EnvelopeNonce,
    /// The GCM authentication tag.
    pub tag: [u8; TAG_LEN],
    /// The ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encrypt plaintext under a fresh nonce.
    ///
    /// Keys are single-use per file, so a random nonce cannot repeat
    /// under the same key; this is the invariant that makes GCM safe here.
    pub fn seal(plaintext: &[u8], key: &SymmetricKey) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| CoreError::Encryption(e.to_string()))?;
        let nonce = EnvelopeNonce::generate();

        let mut sealed = cipher
            .encrypt(Nonce::from_slice(nonce.as_bytes()), plaintext)
            .map_err(|e| CoreError::Encryption(e.to_string()))?;

        // aes-gcm appends the tag to the ciphertext; the wire format
        // carries it between the nonce and the ciphertext.
        let boundary = sealed.len() - TAG_LEN;
        let tag_bytes = sealed.split_off(boundary);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&tag_bytes);

        Ok(Self {
            nonce,
            tag,
            ciphertext: sealed,
        })
    }

    /// Decrypt and verify.
    ///
    /// Fails with [`CoreError::AuthenticationFailure`] if any bit of the
    /// nonce, tag, or ciphertext was altered or the key is wrong. No
    /// plaintext is ever returned on a failed verification.
    pub fn open(&self, key: &SymmetricKey) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| CoreError::Encryption(e.to_string()))?;

        let mut sealed = Vec::with_capacity(self.ciphertext.len() + TAG_LEN);
        sealed.extend_from_slice(&self.ciphertext);
        sealed.extend_from_slice(&self.tag);

        cipher
            .decrypt(Nonce::from_slice(self.nonce.as_bytes()), sealed.as_slice())
            .map_err(|_| CoreError::AuthenticationFailure)
    }

    /// Serialize to the fixed wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MIN_ENVELOPE_LEN + self.ciphertext.len());
        out.extend_from_slice(self.nonce.as_bytes());
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Deserialize from the fixed wire layout, splitting at offsets 12 and 28.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MIN_ENVELOPE_LEN {
            return Err(CoreError::MalformedEnvelope {
                len: bytes.len(),
                min: MIN_ENVELOPE_LEN,
            });
        }

        let mut nonce = [0u8; EnvelopeNonce::LEN];
        nonce.copy_from_slice(&bytes[..EnvelopeNonce::LEN]);

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[EnvelopeNonce::LEN..MIN_ENVELOPE_LEN]);

        Ok(Self {
            nonce: EnvelopeNonce::from_bytes(nonce),
            tag,
            ciphertext: bytes[MIN_ENVELOPE_LEN..].to_vec(),
        })
    }
}
