//! # Custody Grants
//!
//! Recipient key material and per-recipient key wrapping.
//!
//! ## Overview
//!
//! Every file is sealed under a fresh symmetric key. To authorize a
//! recipient, that key is wrapped under the recipient's RSA public key
//! and the resulting text is stored as a grant on the ledger. Only the
//! holder of the matching private key can recover the content key.
//!
//! ## Wrapped Key Format
//!
//! `base64(RSA-OAEP-SHA256(base64(raw 32-byte key)))` — a printable
//! string suitable for a ledger text field. See [`wrap`].
//!
//! ## Key Concepts
//!
//! - **Wrapping**: encrypting a symmetric key so only one recipient can
//!   recover it
//! - **Registry PEM**: public keys travel as PEM text through the
//!   ledger's identity registry; a missing or truncated entry fails
//!   before any cryptography runs

pub mod error;
pub mod keys;
pub mod wrap;

pub use error::{GrantError, Result};
pub use keys::{RecipientPrivateKey, RecipientPublicKey, MIN_PEM_LEN, RSA_BITS};
pub use wrap::WrappedKey;
