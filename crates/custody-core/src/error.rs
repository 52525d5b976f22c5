//! Error types for Custody core operations.

use thiserror::Error;

/// Errors that can occur while sealing, opening, or framing envelopes.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The GCM tag did not verify: corruption, a wrong key, or tampering.
    #[error("authentication failure: envelope tag did not verify")]
    AuthenticationFailure,

    /// Serialized envelope shorter than the nonce + tag minimum.
    #[error("malformed envelope: {len} bytes, minimum is {min}")]
    MalformedEnvelope { len: usize, min: usize },

    /// Cipher setup or encryption failed.
    #[error("encryption error: {0}")]
    Encryption(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
