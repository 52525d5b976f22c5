//! Per-recipient wrapping of the symmetric content key.
//!
//! A wrapped key is `base64(RSA-OAEP-SHA256(base64(raw 32 bytes)))`.
//! The inner base64 keeps the OAEP payload printable regardless of key
//! encoding; the outer base64 makes the ciphertext an opaque string the
//! ledger can store in a text field. Both layers are part of the format
//! contract and must be reversed in order on unwrap.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rsa::Oaep;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

use custody_core::SymmetricKey;

use crate::error::{GrantError, Result};
use crate::keys::{RecipientPrivateKey, RecipientPublicKey};

/// A symmetric key encrypted to one recipient, as ledger-storable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WrappedKey(String);

impl WrappedKey {
    /// Encrypt a content key under a recipient's public key.
    pub fn wrap(key: &SymmetricKey, recipient: &RecipientPublicKey) -> Result<Self> {
        let mut key_text = BASE64.encode(key.as_bytes());

        let ciphertext = recipient
            .inner()
            .encrypt(
                &mut rand::thread_rng(),
                Oaep::new::<Sha256>(),
                key_text.as_bytes(),
            )
            .map_err(|e| GrantError::WrapFailure(e.to_string()));
        key_text.zeroize();

        Ok(Self(BASE64.encode(ciphertext?)))
    }

    /// Recover the content key with the recipient's private key.
    ///
    /// Any base64 or OAEP padding error, and any recovered key that is
    /// not exactly 32 bytes, is [`GrantError::KeyUnwrapFailure`].
    pub fn unwrap_with(&self, recipient: &RecipientPrivateKey) -> Result<SymmetricKey> {
        let ciphertext = BASE64
            .decode(&self.0)
            .map_err(|e| GrantError::KeyUnwrapFailure(format!("outer base64: {e}")))?;

        let mut key_text = recipient
            .inner()
            .decrypt(Oaep::new::<Sha256>(), &ciphertext)
            .map_err(|e| GrantError::KeyUnwrapFailure(format!("rsa-oaep: {e}")))?;

        let raw = BASE64.decode(&key_text);
        key_text.zeroize();
        let mut raw = raw.map_err(|e| GrantError::KeyUnwrapFailure(format!("inner base64: {e}")))?;

        if raw.len() != SymmetricKey::LEN {
            let len = raw.len();
            raw.zeroize();
            return Err(GrantError::KeyUnwrapFailure(format!(
                "recovered key is {len} bytes, expected {}",
                SymmetricKey::LEN
            )));
        }

        let mut bytes = [0u8; SymmetricKey::LEN];
        bytes.copy_from_slice(&raw);
        raw.zeroize();
        let key = SymmetricKey::from_bytes(bytes);
        bytes.zeroize();
        Ok(key)
    }

    /// The ledger-stored string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an opaque string read back from the ledger.
    pub fn from_ledger(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl std::fmt::Display for WrappedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair() -> (RecipientPrivateKey, RecipientPublicKey) {
        let private = RecipientPrivateKey::generate().unwrap();
        let public = private.public_key();
        (private, public)
    }

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let (private, public) = keypair();
        let key = SymmetricKey::generate();

        let wrapped = WrappedKey::wrap(&key, &public).unwrap();
        let recovered = wrapped.unwrap_with(&private).unwrap();

        assert_eq!(key.as_bytes(), recovered.as_bytes());
    }

    #[test]
    fn test_wrapped_key_is_printable() {
        let (_, public) = keypair();
        let wrapped = WrappedKey::wrap(&SymmetricKey::generate(), &public).unwrap();
        assert!(wrapped.as_str().is_ascii());
        assert!(BASE64.decode(wrapped.as_str()).is_ok());
    }

    #[test]
    fn test_wrap_is_randomized() {
        let (_, public) = keypair();
        let key = SymmetricKey::generate();
        let w1 = WrappedKey::wrap(&key, &public).unwrap();
        let w2 = WrappedKey::wrap(&key, &public).unwrap();
        // OAEP is randomized; identical keys must not produce identical text
        assert_ne!(w1, w2);
    }

    #[test]
    fn test_wrong_private_key_fails() {
        let (_, public) = keypair();
        let (other_private, _) = keypair();

        let wrapped = WrappedKey::wrap(&SymmetricKey::generate(), &public).unwrap();
        let err = wrapped.unwrap_with(&other_private).unwrap_err();
        assert!(matches!(err, GrantError::KeyUnwrapFailure(_)));
    }

    #[test]
    fn test_non_base64_fails() {
        let (private, _) = keypair();
        let wrapped = WrappedKey::from_ledger("not base64 at all!!!");
        let err = wrapped.unwrap_with(&private).unwrap_err();
        assert!(matches!(err, GrantError::KeyUnwrapFailure(_)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let (private, public) = keypair();
        let wrapped = WrappedKey::wrap(&SymmetricKey::generate(), &public).unwrap();

        let mut raw = BASE64.decode(wrapped.as_str()).unwrap();
        raw[0] ^= 0xff;
        let tampered = WrappedKey::from_ledger(BASE64.encode(raw));

        let err = tampered.unwrap_with(&private).unwrap_err();
        assert!(matches!(err, GrantError::KeyUnwrapFailure(_)));
    }

    #[test]
    fn test_wrong_inner_length_fails() {
        // A valid OAEP payload that decodes to 16 bytes, not 32
        let (private, public) = keypair();
        let short = BASE64.encode([0u8; 16]);
        let ciphertext = public
            .inner()
            .encrypt(
                &mut rand::thread_rng(),
                Oaep::new::<Sha256>(),
                short.as_bytes(),
            )
            .unwrap();
        let wrapped = WrappedKey::from_ledger(BASE64.encode(ciphertext));

        let err = wrapped.unwrap_with(&private).unwrap_err();
        match err {
            GrantError::KeyUnwrapFailure(reason) => assert!(reason.contains("16 bytes")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
