//! Error types for the grants module.

use thiserror::Error;

/// Errors that can occur during key wrapping and recipient key handling.
#[derive(Debug, Error)]
pub enum GrantError {
    /// The identity registry holds no usable key for the recipient.
    ///
    /// Raised before any cryptographic operation is attempted.
    #[error("recipient key missing: {0}")]
    RecipientKeyMissing(String),

    /// A registry entry was present but not a parseable public key.
    #[error("invalid recipient key: {0}")]
    InvalidRecipientKey(String),

    /// RSA-OAEP encryption of the wrapped key failed.
    #[error("key wrap failed: {0}")]
    WrapFailure(String),

    /// Unwrapping failed: bad base64, a padding error, or a recovered
    /// key that is not exactly 32 bytes.
    #[error("key unwrap failed: {0}")]
    KeyUnwrapFailure(String),

    /// Key pair generation or PEM encoding failed.
    #[error("key material error: {0}")]
    KeyMaterial(String),
}

/// Result type for grant operations.
pub type Result<T> = std::result::Result<T, GrantError>;
